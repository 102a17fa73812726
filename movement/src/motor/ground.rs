/*!
Ground probing.

A sphere (the capsule's lower hemisphere, shrunk by the skin width and capped by the configured
ground check radius) is cast straight down from just above the feet. The hit is classified by
slope angle, then checked for ledges:

- The lateral offset between the contact point and the capsule axis tells whether the capsule is
  resting on an edge rather than on a surface directly underfoot.
- Two short rays, one on each side of the contact, sample the "inner" (toward the axis) and
  "outer" surfaces. A missing inner surface means the axis hangs over the drop; both surfaces
  present but at a sharp angle is a denivelation.
- Either condition beyond its configured limit marks the ground as found but unstable
  (`snapping_prevented`). The motor then refuses to snap and the state layer falls.

When the contact is missing or unstable, a single ray measures how far walkable floor is straight
under the feet, within step reach, so the state layer can tell a stair drop or a step corner from
a real fall.
*/

use crate::collision::SpatialQuery;
use crate::modules::slope;
use crate::types::{CapsuleSpec, Vec3, up};
use crate::utils::{angle_degrees, flatten};

use super::settings::{
    LEDGE_MIN_OFFSET, LEDGE_PROBE_HEIGHT, LEDGE_PROBE_OFFSET, MIN_PROBE_RADIUS, MotorSettings,
};

/// Ledge and stability classification of a ground contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityReport {
    /// Found, walkable and not at an unstable ledge.
    pub is_stable: bool,
    pub found_inner_normal: bool,
    pub inner_normal: Vec3,
    pub found_outer_normal: bool,
    pub outer_normal: Vec3,
    pub ledge_detected: bool,
    /// The capsule axis is over the missing side of a ledge.
    pub is_on_empty_side_of_ledge: bool,
    /// Horizontal distance between the capsule axis and the ledge contact.
    pub distance_from_ledge: f32,
    /// Angle between the inner and outer surfaces, degrees.
    pub denivelation_angle: f32,
    pub snapping_prevented: bool,
}

impl StabilityReport {
    /// Contact on a continuous surface.
    fn uniform(normal: Vec3, stable: bool) -> Self {
        Self {
            is_stable: stable,
            found_inner_normal: true,
            inner_normal: normal,
            found_outer_normal: true,
            outer_normal: normal,
            ledge_detected: false,
            is_on_empty_side_of_ledge: false,
            distance_from_ledge: 0.0,
            denivelation_angle: 0.0,
            snapping_prevented: false,
        }
    }

    fn none() -> Self {
        Self {
            is_stable: false,
            found_inner_normal: false,
            inner_normal: up(),
            found_outer_normal: false,
            outer_normal: up(),
            ledge_detected: false,
            is_on_empty_side_of_ledge: false,
            distance_from_ledge: 0.0,
            denivelation_angle: 0.0,
            snapping_prevented: false,
        }
    }
}

/// Result of one ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundInfo {
    /// Some surface was found within probe range, walkable or not.
    pub grounded: bool,
    pub point: Vec3,
    pub normal: Vec3,
    pub slope_angle: f32,
    pub is_walkable: bool,
    /// Vertical gap between the feet and the surface below; `INFINITY` beyond step reach.
    pub distance: f32,
    /// Gap to walkable floor straight under the feet within step reach, `INFINITY` if none.
    /// Only measured when the contact is not stable, otherwise equal to `distance`.
    pub floor_below: f32,
    pub stability: StabilityReport,
    pub just_landed: bool,
    pub just_left_ground: bool,
}

impl GroundInfo {
    /// Nothing below.
    pub fn none() -> Self {
        Self {
            grounded: false,
            point: Vec3::zeros(),
            normal: up(),
            slope_angle: 0.0,
            is_walkable: false,
            distance: f32::INFINITY,
            floor_below: f32::INFINITY,
            stability: StabilityReport::none(),
            just_landed: false,
            just_left_ground: false,
        }
    }

    #[inline]
    pub fn is_stable(&self) -> bool {
        self.stability.is_stable
    }

    #[inline]
    pub fn snapping_prevented(&self) -> bool {
        self.stability.snapping_prevented
    }
}

impl Default for GroundInfo {
    fn default() -> Self {
        Self::none()
    }
}

/// Probes the ground under a capsule standing at `feet`.
///
/// `snap_distance` is how far below the resting contact ground is still accepted;
/// `horizontal_speed` feeds the ledge snap speed limit.
pub fn probe_ground<Q: SpatialQuery + ?Sized>(
    world: &Q,
    capsule: &CapsuleSpec,
    settings: &MotorSettings,
    feet: Vec3,
    snap_distance: f32,
    horizontal_speed: f32,
) -> GroundInfo {
    let radius = settings
        .ground_check_radius
        .min(capsule.cast_radius())
        .max(MIN_PROBE_RADIUS);
    let center = feet + up() * (capsule.radius + capsule.skin_width);
    // Cast distance at which the sphere touches a flat floor level with the feet.
    let rest = capsule.radius + capsule.skin_width - radius;

    let Some(hit) = world.sphere_cast(
        center,
        radius,
        -up(),
        rest + snap_distance.max(0.0),
        settings.layers,
    ) else {
        let floor_below = drop_below(world, capsule, settings, feet);
        return GroundInfo {
            distance: floor_below,
            floor_below,
            ..GroundInfo::none()
        };
    };

    let slope_angle = slope::slope_angle(hit.normal);
    let is_walkable = slope::is_walkable(slope_angle, settings.max_slope_angle);
    let mut stability = if settings.ledge_detection_enabled {
        evaluate_ledge(world, settings, feet, hit.point, hit.normal, horizontal_speed)
    } else {
        StabilityReport::uniform(hit.normal, true)
    };
    stability.is_stable = is_walkable && !stability.snapping_prevented;
    let distance = hit.distance - rest;
    let floor_below = if stability.is_stable {
        distance
    } else {
        drop_below(world, capsule, settings, feet)
    };

    GroundInfo {
        grounded: true,
        point: hit.point,
        normal: hit.normal,
        slope_angle,
        is_walkable,
        distance,
        floor_below,
        stability,
        just_landed: false,
        just_left_ground: false,
    }
}

/// Vertical distance to walkable floor within step reach, `INFINITY` if none.
fn drop_below<Q: SpatialQuery + ?Sized>(
    world: &Q,
    capsule: &CapsuleSpec,
    settings: &MotorSettings,
    feet: Vec3,
) -> f32 {
    let skin = capsule.skin_width;
    world
        .ray_cast(
            feet + up() * skin,
            -up(),
            settings.max_step_height + skin,
            settings.layers,
        )
        .filter(|hit| slope::is_walkable(slope::slope_angle(hit.normal), settings.max_slope_angle))
        .map_or(f32::INFINITY, |hit| (hit.distance - skin).max(0.0))
}

fn evaluate_ledge<Q: SpatialQuery + ?Sized>(
    world: &Q,
    settings: &MotorSettings,
    feet: Vec3,
    point: Vec3,
    normal: Vec3,
    horizontal_speed: f32,
) -> StabilityReport {
    let lateral = flatten(point - feet);
    let offset = lateral.norm();
    if offset < LEDGE_MIN_OFFSET {
        return StabilityReport::uniform(normal, true);
    }
    let toward_contact = lateral / offset;

    let reach = LEDGE_PROBE_HEIGHT + settings.max_step_height.max(LEDGE_PROBE_OFFSET);
    let lift = up() * LEDGE_PROBE_HEIGHT;
    let inner = world.ray_cast(
        point - toward_contact * LEDGE_PROBE_OFFSET + lift,
        -up(),
        reach,
        settings.layers,
    );
    let outer = world.ray_cast(
        point + toward_contact * LEDGE_PROBE_OFFSET + lift,
        -up(),
        reach,
        settings.layers,
    );

    let mut report = StabilityReport::uniform(normal, true);
    report.found_inner_normal = inner.is_some();
    report.found_outer_normal = outer.is_some();
    if let Some(h) = inner {
        report.inner_normal = h.normal;
    }
    if let Some(h) = outer {
        report.outer_normal = h.normal;
    }

    report.ledge_detected = inner.is_none() || outer.is_none();
    report.is_on_empty_side_of_ledge = inner.is_none();
    report.distance_from_ledge = offset;
    if let (Some(i), Some(o)) = (inner, outer) {
        report.denivelation_angle = angle_degrees(i.normal, o.normal);
    }

    let too_far_over_edge = report.is_on_empty_side_of_ledge
        && offset > settings.max_stable_distance_from_ledge;
    let too_sharp = report.denivelation_angle > settings.max_stable_denivelation_angle;
    let too_fast = report.ledge_detected
        && settings.max_velocity_for_ledge_snap > 0.0
        && horizontal_speed > settings.max_velocity_for_ledge_snap;
    report.snapping_prevented = too_far_over_edge || too_sharp || too_fast;

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionWorld, WorldStaticDef};
    use crate::motor::settings::GROUND_CONTACT_TOLERANCE;
    use crate::types::Quat;

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::new(0.3, 1.8, 0.02)
    }

    /// Platform with its top at y = 0 covering x <= 0, open drop beyond.
    fn platform() -> CollisionWorld {
        CollisionWorld::build([WorldStaticDef::cuboid(
            1,
            Vec3::new(-5.0, -2.5, 0.0),
            Vec3::new(5.0, 2.5, 5.0),
        )])
    }

    #[test]
    fn resting_on_flat_ground_is_stable_with_zero_gap() {
        let world = platform();
        let settings = MotorSettings::default();
        let g = probe_ground(&world, &capsule(), &settings, Vec3::new(-2.0, 0.0, 0.0), 0.2, 0.0);
        assert!(g.grounded && g.is_walkable && g.is_stable());
        assert!(g.distance.abs() < 1.0e-3, "gap {}", g.distance);
        assert!(g.slope_angle < 1.0e-2);
        assert!(!g.stability.ledge_detected);
    }

    #[test]
    fn hovering_within_snap_distance_reports_gap() {
        let world = platform();
        let settings = MotorSettings::default();
        let g = probe_ground(&world, &capsule(), &settings, Vec3::new(-2.0, 0.15, 0.0), 0.2, 0.0);
        assert!(g.grounded);
        assert!((g.distance - 0.15).abs() < 1.0e-3);

        let g = probe_ground(
            &world,
            &capsule(),
            &settings,
            Vec3::new(-2.0, 0.15, 0.0),
            GROUND_CONTACT_TOLERANCE,
            0.0,
        );
        assert!(!g.grounded);
        assert!((g.distance - 0.15).abs() < 1.0e-3, "step reach {}", g.distance);
    }

    #[test]
    fn nothing_below_is_a_miss_not_an_error() {
        let world = platform();
        let g = probe_ground(
            &world,
            &capsule(),
            &MotorSettings::default(),
            Vec3::new(3.0, 0.0, 0.0),
            0.2,
            0.0,
        );
        assert!(!g.grounded && !g.is_stable());
        assert_eq!(g.distance, f32::INFINITY);
    }

    #[test]
    fn axis_past_the_edge_is_flagged_as_ledge() {
        let world = platform();
        let settings = MotorSettings {
            max_stable_distance_from_ledge: 0.1,
            ..MotorSettings::default()
        };
        // Axis 0.15 m past the edge; the hemisphere still rests on the corner.
        let feet = Vec3::new(0.15, 0.0, 0.0);
        let g = probe_ground(&world, &capsule(), &settings, feet, 0.2, 0.0);
        assert!(g.grounded);
        assert!(g.stability.ledge_detected);
        assert!(g.stability.is_on_empty_side_of_ledge);
        assert!(g.stability.distance_from_ledge > 0.1);
        assert!(g.snapping_prevented());
        assert!(!g.is_stable());
    }

    #[test]
    fn ledge_within_tolerance_stays_stable() {
        let world = platform();
        let g = probe_ground(
            &world,
            &capsule(),
            &MotorSettings::default(),
            Vec3::new(0.05, 0.0, 0.0),
            0.2,
            0.0,
        );
        assert!(g.grounded);
        assert!(!g.snapping_prevented());
    }

    #[test]
    fn fast_approach_blocks_ledge_snap_when_limited() {
        let world = platform();
        let settings = MotorSettings {
            max_velocity_for_ledge_snap: 2.0,
            ..MotorSettings::default()
        };
        let feet = Vec3::new(0.1, 0.0, 0.0);
        let slow = probe_ground(&world, &capsule(), &settings, feet, 0.2, 1.0);
        let fast = probe_ground(&world, &capsule(), &settings, feet, 0.2, 6.0);
        assert!(slow.stability.ledge_detected && !slow.snapping_prevented());
        assert!(fast.snapping_prevented());
    }

    #[test]
    fn steep_ramp_is_found_but_not_walkable() {
        let ramp = WorldStaticDef::cuboid(1, Vec3::zeros(), Vec3::new(10.0, 0.5, 10.0))
            .rotated(Quat::from_axis_angle(&Vec3::x_axis(), -60f32.to_radians()));
        let world = CollisionWorld::build([ramp]);
        let settings = MotorSettings::default();
        // Surface above the origin is at y = 1.0; the probe sphere starts 0.1 m (along -Y)
        // clear of the incline.
        let g = probe_ground(&world, &capsule(), &settings, Vec3::new(0.0, 1.34, 0.0), 0.3, 0.0);
        assert!(g.grounded);
        assert!((g.slope_angle - 60.0).abs() < 0.5, "angle {}", g.slope_angle);
        assert!(!g.is_walkable && !g.is_stable());
        assert_eq!(g.floor_below, f32::INFINITY);
    }

    #[test]
    fn step_corner_reports_the_floor_below() {
        // Platform edge at x = 0 with the lower floor 0.25 m down.
        let world = CollisionWorld::build([
            WorldStaticDef::cuboid(1, Vec3::new(-5.0, -2.5, 0.0), Vec3::new(5.0, 2.5, 5.0)),
            WorldStaticDef::cuboid(2, Vec3::new(5.0, -0.75, 0.0), Vec3::new(5.0, 0.5, 5.0)),
        ]);
        let settings = MotorSettings::default();
        // The hemisphere rolls over the corner with the axis 0.24 m past the edge.
        let g = probe_ground(&world, &capsule(), &settings, Vec3::new(0.24, -0.05, 0.0), 0.2, 0.0);
        assert!(g.grounded);
        assert!(!g.is_walkable, "corner angle {}", g.slope_angle);
        assert!(!g.snapping_prevented());
        assert!((g.floor_below - 0.2).abs() < 1.0e-3, "floor below {}", g.floor_below);
    }
}
