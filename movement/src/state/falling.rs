use crate::modules::jump;

use super::{MovementState, StateContext, StateId, airborne, grounded};

/// Descent, whether from a jump apex, a ledge or a ceiling bump.
///
/// A jump press is buffered for `jump_buffer_time` and honoured on landing. Landing severity is
/// derived from the drop below `last_grounded_height` as `v = sqrt(2 g d)`: integrated velocity
/// trails the real contact by a tick or more, the drop does not.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallingState;

impl FallingState {
    /// Height of the surface being landed on, if this tick counts as a landing.
    ///
    /// Stable ground always does. Walkable ground just below does too when the total drop from
    /// the reference height is no deeper than a step, which absorbs stair descents.
    fn landing_surface(ctx: &StateContext<'_>) -> Option<f32> {
        let ground = ctx.sensors.ground();
        let y = ctx.sensors.position().y;
        if ground.is_stable() {
            return Some(y);
        }
        let max_step = ctx.config.max_step_height;
        if ground.grounded
            || ground.snapping_prevented()
            || !jump::is_falling(ctx.data.vertical_velocity)
            || ground.distance > max_step
        {
            return None;
        }
        let surface = y - ground.distance;
        (ctx.data.last_grounded_height - surface <= max_step).then_some(surface)
    }
}

impl MovementState for FallingState {
    fn id(&self) -> StateId {
        StateId::Falling
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        airborne::enter(ctx);
    }

    fn handle_input(&mut self, ctx: &mut StateContext<'_>) -> Option<StateId> {
        if !ctx.data.jump_pressed {
            return None;
        }
        // Coyote jump after walking off an edge. Not after a jump of our own.
        if !ctx.data.left_ground_by_jump && grounded::can_jump(ctx) {
            return Some(StateId::Jumping);
        }
        ctx.locals.jump_buffer = ctx.config.jump_buffer_time;
        None
    }

    fn update(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateId> {
        airborne::update(ctx, dt);
        ctx.locals.jump_buffer = (ctx.locals.jump_buffer - dt).max(0.0);
        None
    }

    fn physics_update(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateId> {
        let surface = Self::landing_surface(ctx)?;

        let config = ctx.config;
        let data = &mut *ctx.data;
        let fall = (data.last_grounded_height - surface).max(0.0);
        let speed = (2.0 * config.gravity * fall).sqrt();
        data.landing_velocity = speed;
        log::trace!("[FallingState] landing after {fall:.2} m at {speed:.2} m/s");

        if ctx.locals.jump_buffer > 0.0 && data.jump_was_released {
            // Touched down for this tick; the next fall is measured from here.
            data.last_grounded_height = surface;
            data.time_since_grounded = 0.0;
            Some(StateId::Jumping)
        } else if speed >= config.hard_landing_threshold {
            Some(StateId::HardLanding)
        } else {
            Some(StateId::SoftLanding)
        }
    }
}
