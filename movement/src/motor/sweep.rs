use crate::bitmask_flags::{CollisionFlag, CollisionFlags};
use crate::collision::SpatialQuery;
use crate::modules::slope;
use crate::types::{CapsuleSpec, Vec3};
use crate::utils::{flatten, project_on_plane};

use super::settings::{MAX_SLIDE_ITERATIONS, MIN_MOVE_SQ, MotorSettings};
use super::step::try_step_up;

/// Outcome of one sweep-and-slide.
#[derive(Clone, Debug)]
pub(crate) struct SweepResult {
    pub end: Vec3,
    /// Normals of the surfaces that blocked the motion, in hit order.
    pub blocking_normals: Vec<Vec3>,
    pub flags: CollisionFlags,
    pub stepped: bool,
}

/// Sweep-and-slide of the capsule along `motion`.
///
/// - Shape-cast the capsule along the remaining motion.
/// - On hit, advance to the contact minus the skin width.
/// - With step handling, a non-walkable obstacle is first offered to the step-up routine.
/// - Otherwise slide: remove the normal component from the leftover. Surfaces too steep to walk
///   on never lift the capsule; their normal is flattened before projecting.
/// - Iterate for corners until `MAX_SLIDE_ITERATIONS` or the leftover is negligible.
pub(crate) fn sweep_and_slide<Q: SpatialQuery + ?Sized>(
    world: &Q,
    capsule: &CapsuleSpec,
    settings: &MotorSettings,
    start: Vec3,
    motion: Vec3,
    step_handling: bool,
) -> SweepResult {
    let skin = capsule.skin_width;
    let mut result = SweepResult {
        end: start,
        blocking_normals: Vec::new(),
        flags: CollisionFlags::empty(),
        stepped: false,
    };
    let mut remaining = motion;

    for _ in 0..MAX_SLIDE_ITERATIONS {
        if remaining.norm_squared() <= MIN_MOVE_SQ {
            break;
        }
        let len = remaining.norm();
        let dir = remaining / len;

        let (a, b) = capsule.segment_at(result.end);
        let Some(hit) = world.capsule_cast(
            a,
            b,
            capsule.cast_radius(),
            dir,
            len + skin,
            settings.layers,
        ) else {
            result.end += remaining;
            break;
        };

        let travel = (hit.distance - skin).clamp(0.0, len);
        result.end += dir * travel;
        let leftover = dir * (len - travel);

        let angle = slope::slope_angle(hit.normal);
        result.flags.add(if angle < 45.0 {
            CollisionFlag::Below
        } else if angle > 135.0 {
            CollisionFlag::Above
        } else {
            CollisionFlag::Sides
        });
        let walkable = slope::is_walkable(angle, settings.max_slope_angle);

        if step_handling && !walkable && !result.stepped {
            let horizontal = flatten(leftover);
            if horizontal.norm_squared() > MIN_MOVE_SQ {
                if let Some(next) =
                    try_step_up(world, capsule, settings, result.end, horizontal, hit.point)
                {
                    result.end = next;
                    result.stepped = true;
                    remaining = leftover - horizontal;
                    continue;
                }
            }
        }

        let mut slide = project_on_plane(leftover, hit.normal);
        if !walkable && slide.y > leftover.y.max(0.0) {
            slide = match flatten(hit.normal).try_normalize(1.0e-6) {
                Some(wall) => project_on_plane(leftover, wall),
                None => project_on_plane(leftover, hit.normal),
            };
        }

        result.blocking_normals.push(hit.normal);
        remaining = slide;
    }

    result
}
