//! Behavior shared by every grounded state.

use super::{StateContext, StateId};

/// Entry bookkeeping: step detection on, vertical velocity cleared, coyote clock reset.
pub(super) fn enter(ctx: &mut StateContext<'_>) {
    let data = &mut *ctx.data;
    data.step_detection_enabled = true;
    data.left_ground_by_jump = false;
    data.time_since_grounded = 0.0;
    data.last_grounded_height = ctx.sensors.position().y;
    if data.vertical_velocity < 0.0 {
        data.intents.request_reset_vertical();
    }
}

/// Jump allowed: released since the last jump, and grounded or within coyote time.
pub(super) fn can_jump(ctx: &StateContext<'_>) -> bool {
    let data = &*ctx.data;
    data.jump_was_released
        && (data.is_grounded || data.time_since_grounded <= ctx.config.coyote_time)
}

/// Jump press that can be honoured right now.
pub(super) fn jump_requested(ctx: &StateContext<'_>) -> Option<StateId> {
    (ctx.data.jump_pressed && can_jump(ctx)).then_some(StateId::Jumping)
}

/// Movement state matching the held buttons. Sprint wins over walk.
pub(super) fn movement_state(ctx: &StateContext<'_>) -> StateId {
    if !ctx.data.has_move_input() {
        StateId::Idling
    } else if ctx.data.sprint_held {
        StateId::Sprinting
    } else if ctx.data.should_walk {
        StateId::Walking
    } else {
        StateId::Running
    }
}

/// Ground tracking. Returns `Falling` when the ground is gone for good.
///
/// - Stable ground refreshes the coyote clock and the reference height.
/// - A ledge or denivelation that prevents snapping falls immediately, and so does a surface too
///   steep to stand on with no walkable floor within step height below.
/// - Otherwise, a drop within step height is absorbed while the reference height stays put, so
///   the total drop is what counts. This covers rolling over a step corner. Anything deeper falls
///   once coyote time runs out.
pub(super) fn track_ground(ctx: &mut StateContext<'_>, dt: f32) -> Option<StateId> {
    let ground = ctx.sensors.ground();
    let y = ctx.sensors.position().y;
    let max_step = ctx.config.max_step_height;
    let data = &mut *ctx.data;

    if ground.is_stable() {
        data.time_since_grounded = 0.0;
        data.last_grounded_height = y;
        return None;
    }
    if ground.snapping_prevented() || (ground.grounded && ground.floor_below > max_step) {
        return Some(StateId::Falling);
    }

    data.time_since_grounded += dt;
    if y >= data.last_grounded_height {
        data.last_grounded_height = y;
        return None;
    }
    let total_drop = data.last_grounded_height - y + ground.floor_below;
    if total_drop <= max_step {
        return None;
    }
    (data.time_since_grounded > ctx.config.coyote_time).then_some(StateId::Falling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use crate::data::ReusableData;
    use crate::motor::GroundInfo;
    use crate::state::StateLocals;
    use crate::state::test_support::FakeSensors;

    const DT: f32 = 1.0 / 60.0;

    fn run(
        data: &mut ReusableData,
        config: &MovementConfig,
        sensors: &FakeSensors,
        f: impl FnOnce(&mut StateContext<'_>) -> Option<StateId>,
    ) -> Option<StateId> {
        let mut locals = StateLocals::default();
        let mut ctx = StateContext {
            data,
            config,
            sensors,
            locals: &mut locals,
        };
        f(&mut ctx)
    }

    #[test]
    fn step_sized_drop_is_absorbed() {
        let config = MovementConfig::default();
        let mut data = ReusableData {
            last_grounded_height: 1.0,
            ..ReusableData::default()
        };
        let mut sensors = FakeSensors::in_air(0.9);
        sensors.ground.distance = 0.15;
        sensors.ground.floor_below = 0.15;
        for _ in 0..60 {
            assert_eq!(run(&mut data, &config, &sensors, |c| track_ground(c, DT)), None);
        }
        assert_eq!(data.last_grounded_height, 1.0);
    }

    #[test]
    fn deep_drop_falls_after_coyote_time() {
        let config = MovementConfig::default();
        let mut data = ReusableData {
            last_grounded_height: 1.0,
            ..ReusableData::default()
        };
        let sensors = FakeSensors::in_air(0.95);
        let mut ticks = 0;
        while run(&mut data, &config, &sensors, |c| track_ground(c, DT)).is_none() {
            ticks += 1;
            assert!(ticks < 60);
        }
        let elapsed = (ticks + 1) as f32 * DT;
        assert!(elapsed >= config.coyote_time - 1.0e-4);
        assert!(elapsed < config.coyote_time + 2.0 * DT);
    }

    #[test]
    fn ledge_without_snapping_falls_immediately() {
        let config = MovementConfig::default();
        let mut data = ReusableData::default();
        let mut sensors = FakeSensors::on_ground(0.0);
        sensors.ground.stability.is_stable = false;
        sensors.ground.stability.snapping_prevented = true;
        assert_eq!(
            run(&mut data, &config, &sensors, |c| track_ground(c, DT)),
            Some(StateId::Falling)
        );
    }

    #[test]
    fn steep_contact_without_floor_falls_immediately() {
        let config = MovementConfig::default();
        let mut data = ReusableData::default();
        let mut sensors = FakeSensors::on_ground(0.0);
        sensors.ground = GroundInfo {
            grounded: true,
            slope_angle: 60.0,
            ..GroundInfo::none()
        };
        assert_eq!(
            run(&mut data, &config, &sensors, |c| track_ground(c, DT)),
            Some(StateId::Falling)
        );
    }

    #[test]
    fn step_corner_contact_is_absorbed() {
        let config = MovementConfig::default();
        let mut data = ReusableData {
            last_grounded_height: 0.25,
            ..ReusableData::default()
        };
        // Hemisphere on the corner of a 0.25 m step, feet slightly below its top.
        let mut sensors = FakeSensors::in_air(0.2);
        sensors.ground = GroundInfo {
            grounded: true,
            slope_angle: 55.0,
            distance: 0.0,
            floor_below: 0.2,
            ..GroundInfo::none()
        };
        assert_eq!(run(&mut data, &config, &sensors, |c| track_ground(c, DT)), None);
        assert_eq!(data.last_grounded_height, 0.25);
    }

    #[test]
    fn coyote_window_for_jumps() {
        let config = MovementConfig::default();
        let sensors = FakeSensors::in_air(0.0);
        let mut data = ReusableData {
            jump_pressed: true,
            time_since_grounded: config.coyote_time - 0.01,
            ..ReusableData::default()
        };
        assert_eq!(run(&mut data, &config, &sensors, |c| jump_requested(c)), Some(StateId::Jumping));

        data.time_since_grounded = config.coyote_time + 0.01;
        assert_eq!(run(&mut data, &config, &sensors, |c| jump_requested(c)), None);

        data.time_since_grounded = 0.0;
        data.jump_was_released = false;
        assert_eq!(run(&mut data, &config, &sensors, |c| jump_requested(c)), None);
    }

    #[test]
    fn sprint_beats_walk() {
        let config = MovementConfig::default();
        let sensors = FakeSensors::on_ground(0.0);
        let mut data = ReusableData {
            should_walk: true,
            sprint_held: true,
            ..ReusableData::default()
        };
        data.move_input.y = 1.0;
        assert_eq!(run(&mut data, &config, &sensors, |c| Some(movement_state(c))), Some(StateId::Sprinting));
        data.sprint_held = false;
        assert_eq!(run(&mut data, &config, &sensors, |c| Some(movement_state(c))), Some(StateId::Walking));
    }
}
