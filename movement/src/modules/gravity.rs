use crate::constants::GROUNDING_VELOCITY;

/// Next vertical velocity.
///
/// Grounded and not ascending pins the velocity to [`GROUNDING_VELOCITY`]; otherwise gravity is
/// integrated and the result clamped to `-max_fall_speed`.
pub fn integrate(v: f32, grounded: bool, gravity: f32, max_fall_speed: f32, dt: f32) -> f32 {
    if grounded && v <= 0.0 {
        return GROUNDING_VELOCITY;
    }
    (v - gravity * dt.max(0.0)).max(-max_fall_speed.abs())
}

/// Grounding velocity when standing on stable ground and not ascending, `v` otherwise.
#[inline]
pub fn ground_snap(v: f32, stable: bool) -> f32 {
    if stable && v <= 0.0 { GROUNDING_VELOCITY } else { v }
}
