use crate::types::{Vec3, up};
use crate::utils::{angle_degrees, inverse_lerp, lerp, project_on_plane};

/// Angle between world up and `normal`, in degrees.
#[inline]
pub fn slope_angle(normal: Vec3) -> f32 {
    angle_degrees(up(), normal)
}

#[inline]
pub fn is_walkable(angle: f32, max_angle: f32) -> bool {
    angle <= max_angle
}

#[inline]
pub fn should_slide(angle: f32, max_angle: f32) -> bool {
    angle > max_angle
}

/// Projects a velocity onto the surface plane.
#[inline]
pub fn project_on_slope(v: Vec3, normal: Vec3) -> Vec3 {
    project_on_plane(v, normal)
}

/// Unit direction along the surface that keeps the heading of `dir` when seen from above.
///
/// Returns zero when `dir` is parallel to `normal`.
pub fn tangent_direction(dir: Vec3, normal: Vec3) -> Vec3 {
    let right = dir.cross(&normal);
    normal
        .cross(&right)
        .try_normalize(1.0e-6)
        .unwrap_or_else(Vec3::zeros)
}

/// Downhill slide velocity on a surface with `normal`.
///
/// Zero unless the surface is steeper than `max_angle`. With `steepness_scaled`, the speed grows
/// from 0 at `max_angle` to `slide_speed` at a vertical wall.
pub fn slide_velocity(normal: Vec3, slide_speed: f32, max_angle: f32, steepness_scaled: bool) -> Vec3 {
    let angle = slope_angle(normal);
    if !should_slide(angle, max_angle) {
        return Vec3::zeros();
    }
    let Some(downhill) = project_on_plane(-up(), normal).try_normalize(1.0e-6) else {
        return Vec3::zeros();
    };
    let intensity = if steepness_scaled {
        inverse_lerp(max_angle, 90.0, angle)
    } else {
        1.0
    };
    downhill * slide_speed * intensity
}

/// Speed scale for moving along `dir` on a surface: below 1 uphill, above 1 downhill.
pub fn speed_multiplier(dir: Vec3, normal: Vec3, uphill_penalty: f32, downhill_bonus: f32) -> f32 {
    let Some(dir) = dir.try_normalize(1.0e-6) else {
        return 1.0;
    };
    let Some(downhill) = up().cross(&normal).cross(&normal).try_normalize(1.0e-6) else {
        // Flat ground.
        return 1.0;
    };
    let along = dir.dot(&downhill);
    if along < 0.0 {
        lerp(1.0, uphill_penalty, -along)
    } else {
        lerp(1.0, downhill_bonus, along)
    }
}
