use crate::collision::SpatialQuery;
use crate::modules::slope;
use crate::types::{CapsuleSpec, Vec3, up};
use crate::utils::height_above;

use super::settings::{
    MIN_STEP_CLEARANCE, MotorSettings, STEP_PROBE_CLEARANCE, STEP_PROBE_MIN_DEPTH,
};

/// Tries to climb the obstacle touched at `contact` while moving by `horizontal`.
///
/// Steps:
/// - Cast a ray down from above the obstacle, `min_step_depth` past the contact, to find its top.
/// - Accept a rise in `[MIN_STEP_CLEARANCE, max_step_height]` above the feet with a walkable top.
/// - Check headroom above the capsule for the lift.
/// - Repeat the horizontal move from the lifted pose.
///
/// Returns the new feet position, or `None` when the obstacle is a wall.
pub(crate) fn try_step_up<Q: SpatialQuery + ?Sized>(
    world: &Q,
    capsule: &CapsuleSpec,
    settings: &MotorSettings,
    feet: Vec3,
    horizontal: Vec3,
    contact: Vec3,
) -> Option<Vec3> {
    if settings.max_step_height < MIN_STEP_CLEARANCE {
        return None;
    }
    let dist = horizontal.norm();
    let dir = horizontal.try_normalize(1.0e-6)?;

    let depth = settings.min_step_depth.max(STEP_PROBE_MIN_DEPTH);
    let probe_top = feet.y + settings.max_step_height + STEP_PROBE_CLEARANCE;
    let mut origin = contact + dir * depth;
    origin.y = probe_top;

    let top = world.ray_cast(
        origin,
        -up(),
        settings.max_step_height + STEP_PROBE_CLEARANCE,
        settings.layers,
    )?;

    let rise = height_above(top.point, feet);
    if !(MIN_STEP_CLEARANCE..=settings.max_step_height).contains(&rise) {
        log::trace!("[Motor] step rejected: rise {rise:.3} m");
        return None;
    }
    if !slope::is_walkable(slope::slope_angle(top.normal), settings.max_slope_angle) {
        log::trace!("[Motor] step rejected: top too steep");
        return None;
    }

    let lift = rise + capsule.skin_width;
    let (_, head) = capsule.segment_at(feet);
    if world
        .sphere_cast(head, capsule.cast_radius(), up(), lift, settings.layers)
        .is_some()
    {
        log::trace!("[Motor] step rejected: no headroom");
        return None;
    }

    let lifted = feet + up() * lift;
    let (a, b) = capsule.segment_at(lifted);
    let travel = match world.capsule_cast(
        a,
        b,
        capsule.cast_radius(),
        dir,
        dist + capsule.skin_width,
        settings.layers,
    ) {
        None => dist,
        Some(hit) => (hit.distance - capsule.skin_width).clamp(0.0, dist),
    };
    if travel <= STEP_PROBE_MIN_DEPTH.min(dist * 0.5) {
        log::trace!("[Motor] step rejected: blocked after lift");
        return None;
    }

    Some(lifted + dir * travel)
}
