/*!
Math aliases and small value types shared by every movement submodule.

Notes
- World up is +Y, forward is +Z, right is +X.
- Positions handed to and returned from the motor are the capsule's feet (bottom of the lower
  hemisphere), not its center.
*/

use nalgebra as na;

pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// World-space up axis.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Y-aligned capsule used by the motor.
///
/// `height` is the full height including both hemispheres. `skin_width` is the separation kept
/// from surfaces: every cast uses `radius - skin_width` so that resting contact never produces
/// a hit.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub height: f32,
    pub skin_width: f32,
}

impl CapsuleSpec {
    #[inline]
    pub fn new(radius: f32, height: f32, skin_width: f32) -> Self {
        Self {
            radius,
            height,
            skin_width,
        }
    }

    /// Radius used by every cast.
    #[inline]
    pub fn cast_radius(&self) -> f32 {
        (self.radius - self.skin_width).max(0.0)
    }

    /// Offset from the feet to the center of the lower hemisphere.
    #[inline]
    pub fn bottom_sphere_offset(&self) -> f32 {
        self.radius
    }

    /// Offset from the feet to the center of the upper hemisphere.
    #[inline]
    pub fn top_sphere_offset(&self) -> f32 {
        (self.height - self.radius).max(self.radius)
    }

    /// Segment endpoints (hemisphere centers) for a capsule standing at `feet`.
    #[inline]
    pub fn segment_at(&self, feet: Vec3) -> (Vec3, Vec3) {
        (
            feet + up() * self.bottom_sphere_offset(),
            feet + up() * self.top_sphere_offset(),
        )
    }
}

impl Default for CapsuleSpec {
    fn default() -> Self {
        Self {
            radius: 0.3,
            height: 1.8,
            skin_width: crate::motor::settings::DEFAULT_SKIN,
        }
    }
}
