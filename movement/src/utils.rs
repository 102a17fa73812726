use crate::types::{Vec2, Vec3, up};

/// Yaw (radians about +Y) facing along a planar direction, with 0 facing +Z.
pub fn yaw_from_xz(xz: Vec2) -> Option<f32> {
    if xz.norm_squared() > crate::constants::YAW_EPS {
        return Some(xz.x.atan2(xz.y));
    }

    None
}

/// Unit forward vector for a yaw angle (radians).
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Drops the vertical component.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Position of `v` between `a` and `b`, clamped to [0, 1]. Returns 0 for an empty range.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

/// Moves `current` toward `target` by at most `max_delta`, never overshooting.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist_sq = delta.norm_squared();
    if dist_sq == 0.0 || (max_delta >= 0.0 && dist_sq <= max_delta * max_delta) {
        return target;
    }
    let dist = dist_sq.sqrt();
    current + delta / dist * max_delta
}

/// Wraps an angle in degrees to (-180, 180].
#[inline]
pub fn wrap_degrees(mut a: f32) -> f32 {
    a %= 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Moves an angle (degrees) toward a target along the shortest arc by at most `max_delta`.
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = wrap_degrees(target - current);
    if diff.abs() <= max_delta {
        return current + diff;
    }
    current + diff.signum() * max_delta
}

/// Removes the component of `v` along the (unit) `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(&normal)
}

/// Unsigned angle between two vectors, in degrees.
pub fn angle_degrees(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.norm_squared() * b.norm_squared()).sqrt();
    if denom <= 1.0e-12 {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed vertical distance of `point` above `feet`.
#[inline]
pub fn height_above(point: Vec3, feet: Vec3) -> f32 {
    (point - feet).dot(&up())
}
