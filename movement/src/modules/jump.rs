use crate::bitmask_flags::LayerMask;
use crate::collision::SpatialQuery;
use crate::types::{Vec3, up};

/// Launch speed reaching `height` under `gravity`: `sqrt(2 g h)`.
#[inline]
pub fn impulse(height: f32, gravity: f32) -> f32 {
    (2.0 * gravity.max(0.0) * height.max(0.0)).sqrt()
}

/// Launch speed reaching `height` in `duration` seconds: `2h / t`.
#[inline]
pub fn velocity_for_duration(height: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    2.0 * height / duration
}

/// Gravity producing an apex at `height` after `duration` seconds: `2h / t^2`.
#[inline]
pub fn gravity_for_duration(height: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    2.0 * height / (duration * duration)
}

/// Variable jump height.
///
/// Returns the new velocity and the updated "already released" flag. The cut is applied once,
/// on the first call where the button is no longer held while still rising.
pub fn variable_cut(v: f32, held: bool, already_released: bool, cut_multiplier: f32) -> (f32, bool) {
    if held || already_released {
        return (v, already_released);
    }
    if v > 0.0 {
        (v * cut_multiplier, true)
    } else {
        (v, true)
    }
}

#[inline]
pub fn is_ascending(v: f32) -> bool {
    v > 0.0
}

#[inline]
pub fn is_falling(v: f32) -> bool {
    v <= 0.0
}

/// Sphere standing in for the head of the capsule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CeilingProbe {
    pub center: Vec3,
    pub radius: f32,
}

/// True when something blocks the probe within `distance` straight up.
pub fn ceiling_hit<Q: SpatialQuery + ?Sized>(
    query: &Q,
    probe: &CeilingProbe,
    distance: f32,
    mask: LayerMask,
) -> bool {
    if distance <= 0.0 {
        return false;
    }
    query
        .sphere_cast(probe.center, probe.radius, up(), distance, mask)
        .is_some()
}
