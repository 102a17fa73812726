use crate::config::MovementConfig;
use crate::utils::{inverse_lerp, lerp};

use super::{MovementState, StateContext, StateId, grounded};

/// Recovery time for a landing at `speed`.
///
/// Interpolates from the soft to the hard duration between the two thresholds; at or above the
/// hard threshold it is the hard duration.
pub fn recovery_duration(config: &MovementConfig, speed: f32) -> f32 {
    if speed >= config.hard_landing_threshold {
        return config.hard_landing_duration;
    }
    let t = inverse_lerp(
        config.soft_landing_threshold,
        config.hard_landing_threshold,
        speed,
    );
    lerp(config.soft_landing_duration, config.hard_landing_duration, t)
}

/// Light touchdown. Momentum is kept and the matching movement state takes over next tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftLandingState;

impl MovementState for SoftLandingState {
    fn id(&self) -> StateId {
        StateId::SoftLanding
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        grounded::enter(ctx);
    }

    fn handle_input(&mut self, ctx: &mut StateContext<'_>) -> Option<StateId> {
        grounded::jump_requested(ctx)
    }

    fn update(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateId> {
        grounded::track_ground(ctx, dt).or_else(|| Some(grounded::movement_state(ctx)))
    }
}

/// Heavy touchdown. The character decelerates to a stop for the recovery time.
///
/// A jump pressed during recovery is remembered and fires when recovery ends.
#[derive(Clone, Copy, Debug, Default)]
pub struct HardLandingState;

impl MovementState for HardLandingState {
    fn id(&self) -> StateId {
        StateId::HardLanding
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        grounded::enter(ctx);
        ctx.locals.recovery = recovery_duration(ctx.config, ctx.data.landing_velocity);
        ctx.data.movement_speed_modifier = 0.0;
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        ctx.data.movement_speed_modifier = 1.0;
    }

    fn handle_input(&mut self, ctx: &mut StateContext<'_>) -> Option<StateId> {
        if ctx.data.jump_pressed {
            ctx.locals.jump_buffered = true;
        }
        None
    }

    fn update(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateId> {
        if let Some(next) = grounded::track_ground(ctx, dt) {
            return Some(next);
        }
        ctx.locals.recovery -= dt;
        if ctx.locals.recovery > 0.0 {
            return None;
        }
        if ctx.locals.jump_buffered && ctx.data.jump_was_released {
            return Some(StateId::Jumping);
        }
        Some(grounded::movement_state(ctx))
    }
}
