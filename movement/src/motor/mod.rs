/*!
Kinematic capsule motor.

Owns the capsule's discrete pose and answers one question per tick: "given this motion, where do
I end up and what am I standing on?"

Per move:
- Sweep-and-slide the capsule along the motion. Obstacles too steep to walk on are offered to the
  step-up routine first, when step handling is requested and the capsule stood on stable ground.
- Probe the ground from the end pose. Stable ground and no upward motion snap the feet onto it.
- Record collision flags, the velocity left after removing blocked components, and the
  landed/left-ground transitions.

No velocity decisions are made here.
*/

pub mod ground;
pub mod settings;
mod step;
mod sweep;

pub use ground::{GroundInfo, StabilityReport};
pub use settings::MotorSettings;

use crate::bitmask_flags::CollisionFlags;
use crate::collision::SpatialQuery;
use crate::constants::CEILING_PROBE_RADIUS_SCALE;
use crate::modules::jump::CeilingProbe;
use crate::types::{CapsuleSpec, Quat, Vec3, up};
use crate::utils::flatten;

use settings::GROUND_CONTACT_TOLERANCE;

/// What a single move did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveReport {
    pub ground: GroundInfo,
    pub flags: CollisionFlags,
    pub stepped: bool,
    /// Actual displacement, including step lifts and ground snapping.
    pub displacement: Vec3,
}

/// Restorable motor state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorState {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub ground: GroundInfo,
    pub unground_timer: f32,
}

#[derive(Clone, Debug)]
pub struct CharacterMotor {
    capsule: CapsuleSpec,
    settings: MotorSettings,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    ground: GroundInfo,
    unground_timer: f32,
    flags: CollisionFlags,
}

impl CharacterMotor {
    pub fn new(capsule: CapsuleSpec, settings: MotorSettings, position: Vec3) -> Self {
        Self {
            capsule,
            settings,
            position,
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            ground: GroundInfo::none(),
            unground_timer: 0.0,
            flags: CollisionFlags::empty(),
        }
    }

    #[inline]
    pub fn capsule(&self) -> &CapsuleSpec {
        &self.capsule
    }

    #[inline]
    pub fn settings(&self) -> &MotorSettings {
        &self.settings
    }

    /// Feet position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Velocity of the last move with blocked components removed.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    #[inline]
    pub fn ground(&self) -> &GroundInfo {
        &self.ground
    }

    #[inline]
    pub fn collision_flags(&self) -> CollisionFlags {
        self.flags
    }

    /// Teleports the capsule. Ground contact is forgotten until the next probe.
    pub fn set_position_and_rotation(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
        self.ground = GroundInfo::none();
        self.flags.clear();
    }

    /// Ignores ground for `duration` seconds so an upward launch is not snapped back down.
    pub fn force_unground(&mut self, duration: f32) {
        self.unground_timer = self.unground_timer.max(duration);
        self.ground = GroundInfo::none();
    }

    #[inline]
    pub fn is_forced_unground(&self) -> bool {
        self.unground_timer > 0.0
    }

    /// Sphere at the head of the capsule used for ceiling checks.
    pub fn ceiling_probe(&self) -> CeilingProbe {
        let (_, head) = self.capsule.segment_at(self.position);
        CeilingProbe {
            center: head,
            radius: (self.capsule.radius * CEILING_PROBE_RADIUS_SCALE)
                .min(self.capsule.cast_radius()),
        }
    }

    pub fn state(&self) -> MotorState {
        MotorState {
            position: self.position,
            rotation: self.rotation,
            velocity: self.velocity,
            ground: self.ground,
            unground_timer: self.unground_timer,
        }
    }

    pub fn restore(&mut self, state: &MotorState) {
        self.position = state.position;
        self.rotation = state.rotation;
        self.velocity = state.velocity;
        self.ground = state.ground;
        self.unground_timer = state.unground_timer;
        self.flags.clear();
    }

    /// Moves the capsule by `velocity * dt` and probes the ground at the end pose.
    pub fn move_character<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        velocity: Vec3,
        step_handling: bool,
        dt: f32,
    ) -> MoveReport {
        let dt = dt.max(0.0);
        self.unground_timer = (self.unground_timer - dt).max(0.0);

        let was_stable = self.ground.is_stable();
        let start = self.position;

        let sweep = sweep::sweep_and_slide(
            world,
            &self.capsule,
            &self.settings,
            start,
            velocity * dt,
            step_handling && was_stable,
        );
        let mut position = sweep.end;

        let ascending = velocity.dot(&up()) > 0.0;
        let mut ground = if self.is_forced_unground() {
            GroundInfo::none()
        } else {
            let snap_distance = if was_stable {
                self.settings.ground_check_distance
            } else {
                GROUND_CONTACT_TOLERANCE
            };
            ground::probe_ground(
                world,
                &self.capsule,
                &self.settings,
                position,
                snap_distance,
                flatten(velocity).norm(),
            )
        };

        if ground.is_stable() && !ascending {
            position -= up() * ground.distance;
            ground = GroundInfo {
                distance: 0.0,
                floor_below: 0.0,
                ..ground
            };
        }

        let ground = GroundInfo {
            just_landed: ground.is_stable() && !was_stable,
            just_left_ground: !ground.is_stable() && was_stable,
            ..ground
        };

        let mut resolved = velocity;
        if !sweep.stepped {
            for n in &sweep.blocking_normals {
                let into = resolved.dot(n);
                if into < 0.0 {
                    resolved -= n * into;
                }
            }
        }

        self.position = position;
        self.velocity = resolved;
        self.ground = ground;
        self.flags = sweep.flags;

        MoveReport {
            ground,
            flags: sweep.flags,
            stepped: sweep.stepped,
            displacement: position - start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask_flags::CollisionFlag;
    use crate::collision::{CollisionWorld, WorldStaticDef};

    const DT: f32 = 1.0 / 60.0;

    fn world() -> CollisionWorld {
        CollisionWorld::build([
            WorldStaticDef::cuboid(1, Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0)),
            WorldStaticDef::cuboid(2, Vec3::new(0.0, 1.5, 3.5), Vec3::new(20.0, 1.5, 0.5)),
        ])
    }

    fn motor_at(position: Vec3) -> CharacterMotor {
        CharacterMotor::new(
            CapsuleSpec::new(0.3, 1.8, 0.02),
            MotorSettings::default(),
            position,
        )
    }

    #[test]
    fn falling_capsule_lands_on_floor() {
        let w = world();
        let mut m = motor_at(Vec3::new(0.0, 1.0, 0.0));
        let mut landed = false;
        for _ in 0..120 {
            let r = m.move_character(&w, Vec3::new(0.0, -5.0, 0.0), false, DT);
            if r.ground.just_landed {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(m.position().y.abs() < 0.03, "y = {}", m.position().y);
        assert!(m.ground().is_stable());
        assert!(m.collision_flags().has(CollisionFlag::Below));
        assert!(m.velocity().y.abs() < 1.0e-4);
    }

    #[test]
    fn grounded_walk_keeps_feet_on_floor() {
        let w = world();
        let mut m = motor_at(Vec3::zeros());
        m.move_character(&w, Vec3::new(0.0, -2.0, 0.0), false, DT);
        assert!(m.ground().is_stable());
        for _ in 0..30 {
            m.move_character(&w, Vec3::new(3.0, 0.0, 0.0), true, DT);
            assert!(m.ground().is_stable());
        }
        assert!((m.position().x - 1.5).abs() < 1.0e-3);
        assert!(m.position().y.abs() < 1.0e-3);
    }

    #[test]
    fn wall_removes_blocked_velocity() {
        let w = world();
        let mut m = motor_at(Vec3::new(0.0, 0.0, 2.6));
        m.move_character(&w, Vec3::new(0.0, -2.0, 0.0), false, DT);
        let r = m.move_character(&w, Vec3::new(1.0, 0.0, 6.0), true, DT);
        assert!(r.flags.has(CollisionFlag::Sides));
        assert!(m.velocity().z.abs() < 1.0e-4);
        assert!((m.velocity().x - 1.0).abs() < 1.0e-4);
        assert!(m.position().z < 3.0 - 0.28);
    }

    #[test]
    fn forced_unground_skips_ground_probe() {
        let w = world();
        let mut m = motor_at(Vec3::zeros());
        m.move_character(&w, Vec3::new(0.0, -2.0, 0.0), false, DT);
        assert!(m.ground().is_stable());
        m.force_unground(0.1);
        let r = m.move_character(&w, Vec3::new(0.0, 8.0, 0.0), false, DT);
        assert!(!r.ground.grounded);
        assert!(m.position().y > 0.1);
        assert!(m.is_forced_unground());
    }

    #[test]
    fn teleport_forgets_ground() {
        let w = world();
        let mut m = motor_at(Vec3::zeros());
        m.move_character(&w, Vec3::new(0.0, -2.0, 0.0), false, DT);
        m.set_position_and_rotation(Vec3::new(5.0, 4.0, 0.0), Quat::identity());
        assert!(!m.ground().grounded);
        assert_eq!(m.position(), Vec3::new(5.0, 4.0, 0.0));
    }

    #[test]
    fn restore_round_trips_state() {
        let w = world();
        let mut m = motor_at(Vec3::new(0.0, 0.5, 0.0));
        m.move_character(&w, Vec3::new(1.0, -3.0, 0.0), false, DT);
        let saved = m.state();
        m.move_character(&w, Vec3::new(1.0, -3.0, 0.0), false, DT);
        m.restore(&saved);
        assert_eq!(m.state(), saved);
    }
}
