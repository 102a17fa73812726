use crate::constants::{CEILING_CHECK_DELAY, JUMP_CONFIRM_TIMEOUT};
use crate::modules::jump;

use super::{MovementState, StateContext, StateId, airborne};

/// Ascent after a jump.
///
/// Entering raises the jump intent; the impulse itself is applied by locomotion later in the
/// same tick. Until the rising velocity shows up in the shared data the state does nothing, so a
/// stale grounding velocity is never mistaken for the apex.
#[derive(Clone, Copy, Debug, Default)]
pub struct JumpingState;

impl MovementState for JumpingState {
    fn id(&self) -> StateId {
        StateId::Jumping
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        airborne::enter(ctx);
        let data = &mut *ctx.data;
        data.intents.request_jump();
        data.jump_was_released = false;
        data.left_ground_by_jump = true;
    }

    fn update(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateId> {
        airborne::update(ctx, dt);
        None
    }

    fn physics_update(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateId> {
        let vertical = ctx.data.vertical_velocity;

        if !ctx.locals.impulse_confirmed {
            if jump::is_ascending(vertical) {
                ctx.locals.impulse_confirmed = true;
            } else if ctx.locals.state_time > JUMP_CONFIRM_TIMEOUT {
                log::warn!("[JumpingState] jump impulse never applied, falling");
                return Some(StateId::Falling);
            } else {
                return None;
            }
        }

        if ctx.config.use_variable_jump && !ctx.data.jump_held && !ctx.locals.jump_cut_done {
            ctx.locals.jump_cut_done = true;
            if jump::is_ascending(vertical) {
                ctx.data.intents.request_jump_cut();
            }
        }

        if ctx.locals.state_time > CEILING_CHECK_DELAY
            && ctx.sensors.ceiling_hit(ctx.config.ceiling_check_distance)
        {
            ctx.data.intents.request_reset_vertical();
            return Some(StateId::Falling);
        }

        jump::is_falling(vertical).then_some(StateId::Falling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use crate::data::ReusableData;
    use crate::state::StateLocals;
    use crate::state::test_support::FakeSensors;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        data: ReusableData,
        config: MovementConfig,
        sensors: FakeSensors,
        locals: StateLocals,
        state: JumpingState,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                data: ReusableData {
                    vertical_velocity: -2.0,
                    jump_held: true,
                    ..ReusableData::default()
                },
                config: MovementConfig::default(),
                sensors: FakeSensors::in_air(0.0),
                locals: StateLocals::default(),
                state: JumpingState,
            }
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut JumpingState, &mut StateContext<'_>) -> R) -> R {
            let mut ctx = StateContext {
                data: &mut self.data,
                config: &self.config,
                sensors: &self.sensors,
                locals: &mut self.locals,
            };
            f(&mut self.state, &mut ctx)
        }

        fn physics(&mut self) -> Option<StateId> {
            self.locals.state_time += DT;
            self.with(|s, c| s.physics_update(c, DT))
        }
    }

    #[test]
    fn enter_raises_jump_intent() {
        let mut rig = Rig::new();
        rig.with(|s, c| s.enter(c));
        assert!(rig.data.intents.jump_pending());
        assert!(!rig.data.jump_was_released);
        assert!(rig.data.left_ground_by_jump);
        assert!(!rig.data.step_detection_enabled);
    }

    #[test]
    fn waits_for_impulse_before_checking_apex() {
        let mut rig = Rig::new();
        rig.with(|s, c| s.enter(c));
        // Stale grounding velocity must not end the jump.
        assert_eq!(rig.physics(), None);
        rig.data.vertical_velocity = 8.6;
        assert_eq!(rig.physics(), None);
        assert!(rig.locals.impulse_confirmed);
        rig.data.vertical_velocity = 0.0;
        assert_eq!(rig.physics(), Some(StateId::Falling));
    }

    #[test]
    fn early_release_cuts_once() {
        let mut rig = Rig::new();
        rig.data.vertical_velocity = 5.0;
        rig.data.jump_held = false;
        assert_eq!(rig.physics(), None);
        assert!(rig.data.intents.jump_cut_pending());

        let mut taken = rig.data.intents;
        assert!(taken.take_jump_cut());
        rig.data.intents = taken;
        assert_eq!(rig.physics(), None);
        assert!(!rig.data.intents.jump_cut_pending());
    }

    #[test]
    fn ceiling_resets_vertical_and_falls() {
        let mut rig = Rig::new();
        rig.data.vertical_velocity = 5.0;
        rig.sensors.ceiling = true;
        // Ignored right after takeoff.
        assert_eq!(rig.physics(), None);
        for _ in 0..3 {
            rig.locals.state_time += DT;
        }
        assert_eq!(rig.physics(), Some(StateId::Falling));
        assert!(rig.data.intents.reset_vertical_pending());
    }
}
