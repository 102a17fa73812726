use crate::config::MovementConfig;
use crate::constants::INPUT_DEADZONE_SQ;
use crate::types::{Vec2, Vec3, up};
use crate::utils::{flatten, move_towards};

/// Acceleration knobs, grouped so call sites stay readable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerationRates {
    pub acceleration: f32,
    pub deceleration: f32,
    /// Scale on `acceleration` while airborne with input.
    pub air_control: f32,
    /// Scale on `deceleration` while airborne without input.
    pub air_drag: f32,
}

impl From<&MovementConfig> for AccelerationRates {
    fn from(cfg: &MovementConfig) -> Self {
        Self {
            acceleration: cfg.acceleration,
            deceleration: cfg.deceleration,
            air_control: cfg.air_control,
            air_drag: cfg.air_drag,
        }
    }
}

/// Desired horizontal velocity for a stick input.
///
/// `input.x` is strafe, `input.y` is forward. The input is expressed in the frame of `look`
/// flattened onto the ground plane, or `facing` when `look` has no horizontal component.
/// Input longer than 1 (diagonals on a square stick) is clamped to unit length.
pub fn target_velocity(input: Vec2, look: Vec3, facing: Vec3, speed: f32, speed_modifier: f32) -> Vec3 {
    let magnitude = input.norm().min(1.0);
    if magnitude * magnitude <= f32::EPSILON {
        return Vec3::zeros();
    }

    let flat_look = flatten(look);
    let forward = if flat_look.norm_squared() > INPUT_DEADZONE_SQ {
        flat_look.normalize()
    } else {
        let flat_facing = flatten(facing);
        if flat_facing.norm_squared() > f32::EPSILON {
            flat_facing.normalize()
        } else {
            Vec3::z()
        }
    };
    let right = up().cross(&forward);

    let world = right * input.x + forward * input.y;
    let Some(dir) = world.try_normalize(f32::EPSILON) else {
        return Vec3::zeros();
    };
    dir * speed * speed_modifier * magnitude
}

/// Moves `current` toward `target` by the applicable rate, never overshooting.
///
/// Non-positive `dt` leaves `current` unchanged.
pub fn integrate(current: Vec3, target: Vec3, rates: &AccelerationRates, grounded: bool, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }

    let has_input = target.norm_squared() > INPUT_DEADZONE_SQ;
    let mut rate = if has_input {
        rates.acceleration
    } else {
        rates.deceleration
    };
    if !grounded {
        rate *= if has_input {
            rates.air_control
        } else {
            rates.air_drag
        };
    }

    move_towards(current, target, rate * dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> AccelerationRates {
        AccelerationRates {
            acceleration: 10.0,
            deceleration: 15.0,
            air_control: 0.3,
            air_drag: 0.1,
        }
    }

    #[test]
    fn forward_input_follows_look_direction() {
        let v = target_velocity(Vec2::new(0.0, 1.0), Vec3::z(), Vec3::x(), 5.0, 1.0);
        assert!((v - Vec3::new(0.0, 0.0, 5.0)).norm() < 1.0e-5);

        let v = target_velocity(Vec2::new(0.0, 1.0), Vec3::x(), Vec3::z(), 5.0, 1.0);
        assert!((v - Vec3::new(5.0, 0.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn strafe_right_is_positive_x_when_facing_forward() {
        let v = target_velocity(Vec2::new(1.0, 0.0), Vec3::z(), Vec3::z(), 2.0, 1.0);
        assert!((v - Vec3::new(2.0, 0.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn falls_back_to_facing_when_look_is_vertical() {
        let v = target_velocity(Vec2::new(0.0, 1.0), up(), -Vec3::z(), 3.0, 1.0);
        assert!((v - Vec3::new(0.0, 0.0, -3.0)).norm() < 1.0e-5);
    }

    #[test]
    fn diagonal_input_is_clamped_to_speed() {
        let v = target_velocity(Vec2::new(1.0, 1.0), Vec3::z(), Vec3::z(), 4.0, 1.0);
        assert!((v.norm() - 4.0).abs() < 1.0e-4);
    }

    #[test]
    fn partial_stick_scales_speed_and_modifier_applies() {
        let v = target_velocity(Vec2::new(0.0, 0.5), Vec3::z(), Vec3::z(), 4.0, 2.0);
        assert!((v.norm() - 4.0).abs() < 1.0e-4);
        assert_eq!(target_velocity(Vec2::zeros(), Vec3::z(), Vec3::z(), 4.0, 1.0), Vec3::zeros());
    }

    #[test]
    fn grounded_acceleration_is_rate_limited() {
        let v = integrate(Vec3::zeros(), Vec3::new(0.0, 0.0, 6.0), &rates(), true, 0.1);
        assert!((v.z - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn deceleration_stops_without_overshoot() {
        let mut v = Vec3::new(3.0, 0.0, 0.0);
        for _ in 0..60 {
            v = integrate(v, Vec3::zeros(), &rates(), true, 1.0 / 60.0);
            assert!(v.x >= 0.0);
        }
        assert_eq!(v, Vec3::zeros());
    }

    #[test]
    fn airborne_uses_air_control_and_air_drag_independently() {
        let accel = integrate(Vec3::zeros(), Vec3::new(0.0, 0.0, 6.0), &rates(), false, 0.1);
        assert!((accel.z - 0.3).abs() < 1.0e-5);
        let drag = integrate(Vec3::new(0.0, 0.0, 6.0), Vec3::zeros(), &rates(), false, 0.1);
        assert!((drag.z - (6.0 - 0.15)).abs() < 1.0e-5);
    }

    #[test]
    fn non_positive_dt_changes_nothing() {
        let current = Vec3::new(1.0, 0.0, 2.0);
        let target = Vec3::new(5.0, 0.0, 5.0);
        assert_eq!(integrate(current, target, &rates(), true, 0.0), current);
        assert_eq!(integrate(current, target, &rates(), true, -0.5), current);
    }
}
