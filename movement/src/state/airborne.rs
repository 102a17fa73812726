//! Behavior shared by `Jumping` and `Falling`.

use super::StateContext;

/// Step detection off; the inherited speed modifier is kept but never below walk speed.
pub(super) fn enter(ctx: &mut StateContext<'_>) {
    let data = &mut *ctx.data;
    data.step_detection_enabled = false;
    data.movement_speed_modifier = data.movement_speed_modifier.max(1.0);
}

pub(super) fn update(ctx: &mut StateContext<'_>, dt: f32) {
    ctx.data.time_since_grounded += dt;
}
