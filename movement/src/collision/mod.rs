/*!
Spatial queries consumed by the motor.

The motor never talks to a physics engine directly. It asks a [`SpatialQuery`] for three cast
primitives, each filtered by a [`LayerMask`](crate::bitmask_flags::LayerMask):
- ray cast
- sphere cast
- capsule cast

A hit reports a world-space contact point, a unit surface normal facing against the cast
direction, and the distance traveled along the (unit) direction. Misses are `None`; they are
expected every tick while airborne and are not errors.

[`CollisionWorld`] implements the trait on top of a Rapier static collider set.
*/

mod world;

pub use world::{ColliderShapeDef, CollisionWorld, WorldStaticDef, collider_from_def};

use crate::bitmask_flags::LayerMask;
use crate::types::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastHit {
    /// World-space contact point.
    pub point: Vec3,
    /// Unit surface normal, facing against the cast direction.
    pub normal: Vec3,
    /// Distance traveled along the cast direction before contact.
    pub distance: f32,
}

pub trait SpatialQuery {
    fn ray_cast(&self, origin: Vec3, dir: Vec3, max_distance: f32, mask: LayerMask)
    -> Option<CastHit>;

    fn sphere_cast(
        &self,
        center: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit>;

    /// `a` and `b` are the centers of the two hemispheres.
    fn capsule_cast(
        &self,
        a: Vec3,
        b: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit>;
}

/// Flips `n` so it opposes `dir`, falling back to `-dir` for a degenerate normal.
pub(crate) fn facing_normal(n: Vec3, dir: Vec3) -> Vec3 {
    let Some(n) = n.try_normalize(1.0e-6) else {
        return -dir;
    };
    if n.dot(&dir) > 0.0 { -n } else { n }
}

/// Point of a capsule (segment `a`-`b`, `radius`) furthest along `toward`.
pub(crate) fn capsule_support_point(a: Vec3, b: Vec3, radius: f32, toward: Vec3) -> Vec3 {
    let da = a.dot(&toward);
    let db = b.dot(&toward);
    let base = if (da - db).abs() <= 1.0e-5 {
        (a + b) * 0.5
    } else if da > db {
        a
    } else {
        b
    };
    base + toward * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_normal_opposes_direction() {
        let dir = -Vec3::y();
        assert_eq!(facing_normal(Vec3::y(), dir), Vec3::y());
        assert_eq!(facing_normal(-Vec3::y(), dir), Vec3::y());
        assert_eq!(facing_normal(Vec3::zeros(), dir), Vec3::y());
    }

    #[test]
    fn support_point_picks_the_leading_hemisphere() {
        let a = Vec3::new(0.0, 0.3, 0.0);
        let b = Vec3::new(0.0, 1.5, 0.0);
        let down = capsule_support_point(a, b, 0.3, -Vec3::y());
        assert!((down - Vec3::zeros()).norm() < 1.0e-6);
        let side = capsule_support_point(a, b, 0.3, Vec3::x());
        assert!((side - Vec3::new(0.3, 0.9, 0.0)).norm() < 1.0e-6);
    }
}
