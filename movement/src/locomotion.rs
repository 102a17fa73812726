/*!
Per-tick locomotion.

Turns one tick of intent into a velocity and moves the capsule with it. This is the only place
that owns velocity: states express decisions as a speed modifier and one-shot intents, and
locomotion is the sole consumer of those intents.

Per tick
1. Horizontal basis. On stable ground the previous resolved velocity is laid flat, keeping its
   magnitude, so slope reprojection does not leak into planning. Airborne, the last planned
   horizontal velocity is reused so wall contacts do not eat momentum.
2. Target horizontal velocity from move/look input and the speed modifier, optionally scaled
   for uphill/downhill.
3. Acceleration toward the target.
4. Intents, in order: jump, jump cut, vertical reset. Each is cleared as it is read.
5. Gravity on the post-intent vertical velocity.
6. Slide velocity on ground too steep to stand on.
7. Composition. Stable ground and not ascending: along the ground tangent. Otherwise flat
   horizontal plus vertical.
8. Motor move.
9. Yaw toward the horizontal velocity.
*/

use crate::bitmask_flags::LayerMask;
use crate::collision::SpatialQuery;
use crate::config::MovementConfig;
use crate::constants::{FORCE_UNGROUND_TIME, INPUT_DEADZONE_SQ};
use crate::data::{MovementIntents, ReusableData};
use crate::modules::acceleration::{self, AccelerationRates};
use crate::modules::{gravity, jump, slope};
use crate::motor::{CharacterMotor, GroundInfo, MotorState, MoveReport};
use crate::state::Sensors;
use crate::types::{Quat, Vec2, Vec3, up};
use crate::utils::{flatten, forward_from_yaw, move_towards_angle, project_on_plane, yaw_from_xz};

/// What locomotion needs from the decision layer for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionInput {
    pub move_input: Vec2,
    pub look_direction: Vec3,
    pub speed_modifier: f32,
    pub step_handling: bool,
}

impl From<&ReusableData> for LocomotionInput {
    fn from(data: &ReusableData) -> Self {
        Self {
            move_input: data.move_input,
            look_direction: data.look_direction,
            speed_modifier: data.movement_speed_modifier,
            step_handling: data.step_detection_enabled,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionOutput {
    /// Velocity handed to the motor.
    pub velocity: Vec3,
    pub horizontal_velocity: Vec3,
    pub vertical_velocity: f32,
    pub is_sliding: bool,
    pub report: MoveReport,
}

/// Restorable locomotion state, motor included.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionState {
    pub motor: MotorState,
    pub horizontal_velocity: Vec3,
    pub vertical_velocity: f32,
    pub yaw_degrees: f32,
}

#[derive(Clone, Debug)]
pub struct CharacterLocomotion {
    motor: CharacterMotor,
    horizontal: Vec3,
    vertical: f32,
    /// Facing, degrees about +Y with 0 along +Z.
    yaw: f32,
}

impl CharacterLocomotion {
    pub fn new(motor: CharacterMotor) -> Self {
        let yaw = yaw_of(motor.rotation());
        Self {
            motor,
            horizontal: Vec3::zeros(),
            vertical: 0.0,
            yaw,
        }
    }

    #[inline]
    pub fn motor(&self) -> &CharacterMotor {
        &self.motor
    }

    #[inline]
    pub fn horizontal_velocity(&self) -> Vec3 {
        self.horizontal
    }

    #[inline]
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical
    }

    #[inline]
    pub fn yaw_degrees(&self) -> f32 {
        self.yaw
    }

    /// Read-only view of the motor for the state layer.
    pub fn sensors<'a, Q: SpatialQuery + ?Sized>(
        &'a self,
        world: &'a Q,
        ceiling_mask: LayerMask,
    ) -> MotorSensors<'a, Q> {
        MotorSensors {
            motor: &self.motor,
            world,
            mask: ceiling_mask,
        }
    }

    pub fn simulate<Q: SpatialQuery + ?Sized>(
        &mut self,
        world: &Q,
        config: &MovementConfig,
        input: &LocomotionInput,
        intents: &mut MovementIntents,
        dt: f32,
    ) -> LocomotionOutput {
        let ground = *self.motor.ground();
        let stable = ground.is_stable();

        let current = if stable {
            let along_ground = project_on_plane(self.motor.velocity(), ground.normal);
            flatten(along_ground)
                .try_normalize(1.0e-6)
                .map_or_else(Vec3::zeros, |dir| dir * along_ground.norm())
        } else {
            self.horizontal
        };

        let facing = forward_from_yaw(self.yaw.to_radians());
        let mut target = acceleration::target_velocity(
            input.move_input,
            input.look_direction,
            facing,
            config.walk_speed,
            input.speed_modifier,
        );
        if config.use_slope_speed_modifier && stable {
            target *= slope::speed_multiplier(
                target,
                ground.normal,
                config.uphill_speed_penalty,
                config.downhill_speed_bonus,
            );
        }

        let rates = AccelerationRates::from(config);
        let horizontal = acceleration::integrate(current, target, &rates, stable, dt);

        if intents.take_jump() {
            self.vertical = config.jump_impulse();
            self.motor.force_unground(FORCE_UNGROUND_TIME);
        }
        if intents.take_jump_cut() {
            self.vertical =
                jump::variable_cut(self.vertical, false, false, config.jump_cut_multiplier).0;
        }
        if intents.take_reset_vertical() {
            self.vertical = 0.0;
        }

        let ground = *self.motor.ground();
        self.vertical = gravity::integrate(
            self.vertical,
            ground.is_stable(),
            config.gravity,
            config.max_fall_speed,
            dt,
        );
        if jump::is_ascending(self.vertical) {
            self.motor.force_unground(FORCE_UNGROUND_TIME);
        }

        let ground = *self.motor.ground();
        let is_sliding = ground.grounded && !ground.is_walkable;
        let slide = if is_sliding {
            slope::slide_velocity(
                ground.normal,
                config.slope_slide_speed,
                config.max_slope_angle,
                config.use_slope_dependent_slide_speed,
            )
        } else {
            Vec3::zeros()
        };

        let velocity = compose(&ground, horizontal, self.vertical) + slide;
        let report = self.motor.move_character(world, velocity, input.step_handling, dt);

        self.horizontal = horizontal;
        if config.rotate_towards_movement {
            self.rotate_towards(horizontal, config.rotation_speed * dt);
        }

        LocomotionOutput {
            velocity,
            horizontal_velocity: self.horizontal,
            vertical_velocity: self.vertical,
            is_sliding,
            report,
        }
    }

    /// External impulse, e.g. knockback. Replaces the current velocity.
    pub fn apply_velocity(&mut self, velocity: Vec3) {
        self.horizontal = flatten(velocity);
        self.vertical = velocity.dot(&up());
        self.motor.set_velocity(velocity);
        if jump::is_ascending(self.vertical) {
            self.motor.force_unground(FORCE_UNGROUND_TIME);
        }
    }

    pub fn stop_movement(&mut self) {
        self.horizontal = Vec3::zeros();
        self.vertical = 0.0;
        self.motor.set_velocity(Vec3::zeros());
    }

    pub fn set_position_and_rotation(&mut self, position: Vec3, rotation: Quat) {
        self.motor.set_position_and_rotation(position, rotation);
        self.yaw = yaw_of(rotation);
    }

    pub fn state(&self) -> LocomotionState {
        LocomotionState {
            motor: self.motor.state(),
            horizontal_velocity: self.horizontal,
            vertical_velocity: self.vertical,
            yaw_degrees: self.yaw,
        }
    }

    pub fn restore(&mut self, state: &LocomotionState) {
        self.motor.restore(&state.motor);
        self.horizontal = state.horizontal_velocity;
        self.vertical = state.vertical_velocity;
        self.yaw = state.yaw_degrees;
    }

    fn rotate_towards(&mut self, horizontal: Vec3, max_degrees: f32) {
        if horizontal.norm_squared() <= INPUT_DEADZONE_SQ {
            return;
        }
        let Some(target) = yaw_from_xz(Vec2::new(horizontal.x, horizontal.z)) else {
            return;
        };
        self.yaw = move_towards_angle(self.yaw, target.to_degrees(), max_degrees);
        self.motor.set_rotation(yaw_rotation(self.yaw));
    }
}

/// Final velocity from the planned horizontal and vertical parts.
fn compose(ground: &GroundInfo, horizontal: Vec3, vertical: f32) -> Vec3 {
    if ground.is_stable() && !jump::is_ascending(vertical) {
        // The motor snaps onto stable ground, so the grounding push is not swept.
        if horizontal.norm_squared() > INPUT_DEADZONE_SQ {
            return slope::tangent_direction(horizontal, ground.normal) * horizontal.norm();
        }
        return horizontal;
    }
    horizontal + up() * vertical
}

fn yaw_rotation(degrees: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), degrees.to_radians())
}

fn yaw_of(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::z();
    yaw_from_xz(Vec2::new(forward.x, forward.z)).map_or(0.0, f32::to_degrees)
}

/// [`Sensors`] backed by a motor and the collision world.
pub struct MotorSensors<'a, Q: SpatialQuery + ?Sized> {
    motor: &'a CharacterMotor,
    world: &'a Q,
    mask: LayerMask,
}

impl<Q: SpatialQuery + ?Sized> Sensors for MotorSensors<'_, Q> {
    fn position(&self) -> Vec3 {
        self.motor.position()
    }

    fn ground(&self) -> GroundInfo {
        *self.motor.ground()
    }

    fn ceiling_hit(&self, distance: f32) -> bool {
        jump::ceiling_hit(self.world, &self.motor.ceiling_probe(), distance, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionWorld, WorldStaticDef};
    use crate::constants::GROUNDING_VELOCITY;
    use crate::motor::MotorSettings;
    use crate::types::CapsuleSpec;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;

    fn floor() -> CollisionWorld {
        CollisionWorld::build([WorldStaticDef::cuboid(
            1,
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
        )])
    }

    fn locomotion(config: &MovementConfig) -> CharacterLocomotion {
        CharacterLocomotion::new(CharacterMotor::new(
            CapsuleSpec::default(),
            MotorSettings::from(config),
            Vec3::zeros(),
        ))
    }

    fn idle() -> LocomotionInput {
        LocomotionInput {
            move_input: Vec2::zeros(),
            look_direction: Vec3::z(),
            speed_modifier: 1.0,
            step_handling: true,
        }
    }

    fn settle(loco: &mut CharacterLocomotion, world: &CollisionWorld, config: &MovementConfig) {
        let mut intents = MovementIntents::default();
        for _ in 0..5 {
            loco.simulate(world, config, &idle(), &mut intents, DT);
        }
        assert!(loco.motor().ground().is_stable());
    }

    #[test]
    fn grounded_vertical_velocity_is_pinned() {
        let config = MovementConfig::default();
        let world = floor();
        let mut loco = locomotion(&config);
        settle(&mut loco, &world, &config);
        let mut intents = MovementIntents::default();
        for _ in 0..30 {
            let out = loco.simulate(&world, &config, &idle(), &mut intents, DT);
            assert_eq!(out.vertical_velocity, GROUNDING_VELOCITY);
            assert!(out.report.ground.is_stable());
        }
        assert_abs_diff_eq!(loco.motor().position().y, 0.0, epsilon = 1.0e-3);
    }

    #[test]
    fn jump_intent_is_consumed_once() {
        let config = MovementConfig::default();
        let world = floor();
        let mut loco = locomotion(&config);
        settle(&mut loco, &world, &config);

        let mut intents = MovementIntents::default();
        intents.request_jump();
        let out = loco.simulate(&world, &config, &idle(), &mut intents, DT);
        assert!(intents.is_empty());
        assert_abs_diff_eq!(
            out.vertical_velocity,
            config.jump_impulse() - config.gravity * DT,
            epsilon = 1.0e-4
        );
        assert!(!out.report.ground.grounded);

        let out = loco.simulate(&world, &config, &idle(), &mut intents, DT);
        assert_abs_diff_eq!(
            out.vertical_velocity,
            config.jump_impulse() - 2.0 * config.gravity * DT,
            epsilon = 1.0e-4
        );
    }

    #[test]
    fn intents_apply_in_order() {
        let config = MovementConfig::default();
        let world = floor();
        let mut loco = locomotion(&config);
        settle(&mut loco, &world, &config);

        let mut intents = MovementIntents::default();
        intents.request_jump();
        intents.request_jump_cut();
        let out = loco.simulate(&world, &config, &idle(), &mut intents, DT);
        let expected = config.jump_impulse() * config.jump_cut_multiplier - config.gravity * DT;
        assert_abs_diff_eq!(out.vertical_velocity, expected, epsilon = 1.0e-4);

        intents.request_reset_vertical();
        let out = loco.simulate(&world, &config, &idle(), &mut intents, DT);
        assert_abs_diff_eq!(out.vertical_velocity, -config.gravity * DT, epsilon = 1.0e-4);
    }

    #[test]
    fn walking_accelerates_and_turns_towards_motion() {
        let config = MovementConfig::default();
        let world = floor();
        let mut loco = locomotion(&config);
        settle(&mut loco, &world, &config);

        let input = LocomotionInput {
            move_input: Vec2::new(1.0, 0.0),
            ..idle()
        };
        let mut intents = MovementIntents::default();
        for _ in 0..120 {
            loco.simulate(&world, &config, &input, &mut intents, DT);
        }
        // Strafe right relative to a +Z look is +X.
        assert_abs_diff_eq!(loco.horizontal_velocity().x, config.walk_speed, epsilon = 1.0e-3);
        assert_abs_diff_eq!(loco.yaw_degrees(), 90.0, epsilon = 1.0e-2);
        assert!(loco.motor().position().x > 4.0);
        assert!(loco.motor().ground().is_stable());
    }

    #[test]
    fn apply_velocity_launches_and_ungrounds() {
        let config = MovementConfig::default();
        let world = floor();
        let mut loco = locomotion(&config);
        settle(&mut loco, &world, &config);

        loco.apply_velocity(Vec3::new(2.0, 6.0, 0.0));
        assert!(loco.motor().is_forced_unground());
        let mut intents = MovementIntents::default();
        let out = loco.simulate(&world, &config, &idle(), &mut intents, DT);
        assert!(out.vertical_velocity > 5.0);
        assert!(loco.motor().position().y > 0.05);

        loco.stop_movement();
        assert_eq!(loco.horizontal_velocity(), Vec3::zeros());
        assert_eq!(loco.vertical_velocity(), 0.0);
    }

    #[test]
    fn restore_rewinds_locomotion() {
        let config = MovementConfig::default();
        let world = floor();
        let mut loco = locomotion(&config);
        settle(&mut loco, &world, &config);
        let saved = loco.state();

        let input = LocomotionInput {
            move_input: Vec2::new(0.0, 1.0),
            ..idle()
        };
        let mut intents = MovementIntents::default();
        for _ in 0..10 {
            loco.simulate(&world, &config, &input, &mut intents, DT);
        }
        assert_ne!(loco.state(), saved);
        loco.restore(&saved);
        assert_eq!(loco.state(), saved);
    }
}
