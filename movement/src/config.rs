/*!
Movement configuration.

`MovementConfig` is an immutable parameter set shared by every character simulated with it. It is
deserialized from TOML (every field optional, defaults below) or built in code, then validated
once with [`MovementConfig::validate`].

Validation splits problems in two:
- safety-critical values (speeds, gravity, slope limits, jump height, tick rate) are rejected with
  a [`ConfigError`];
- suspicious but workable values produce a [`ConfigWarning`], logged once. A non-positive ground
  check distance is replaced by a safe minimum.
*/

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bitmask_flags::{CollisionLayer, LayerMask};
use crate::constants::{DEFAULT_JUMP_CUT_MULTIPLIER, FALLBACK_GROUND_CHECK_DISTANCE};
use crate::error::{ConfigError, ConfigWarning};
use crate::modules::jump;
use crate::tick::TickSettings;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // Ground movement
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Multiplier on top of the run/walk ratio while sprinting.
    pub sprint_multiplier: f32,
    pub acceleration: f32,
    pub deceleration: f32,

    // Air movement
    /// Scales acceleration while airborne with input (0 = no control, 1 = full control).
    pub air_control: f32,
    /// Scales deceleration while airborne without input (0 = keep momentum).
    pub air_drag: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,

    // Jumping
    pub jump_height: f32,
    /// Time to apex. Only drives the jump when `derive_gravity_from_jump_duration` is set.
    pub jump_duration: f32,
    /// Replace `gravity` with the value reaching `jump_height` in `jump_duration`.
    pub derive_gravity_from_jump_duration: bool,
    pub jump_cut_multiplier: f32,
    pub use_variable_jump: bool,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub ceiling_check_distance: f32,

    // Ground detection
    pub ground_check_distance: f32,
    pub ground_check_radius: f32,
    pub ground_layers: LayerMask,
    pub max_slope_angle: f32,

    // Steps
    pub max_step_height: f32,
    pub min_step_depth: f32,

    // Ledges
    pub ledge_detection_enabled: bool,
    pub max_stable_distance_from_ledge: f32,
    pub max_stable_denivelation_angle: f32,
    /// Horizontal speed above which the character may not snap at a ledge. 0 disables the check.
    pub max_velocity_for_ledge_snap: f32,

    // Slopes
    pub slope_slide_speed: f32,
    pub use_slope_dependent_slide_speed: bool,
    pub use_slope_speed_modifier: bool,
    pub uphill_speed_penalty: f32,
    pub downhill_speed_bonus: f32,

    // Rotation
    /// Degrees per second.
    pub rotation_speed: f32,
    pub rotate_towards_movement: bool,

    // Landing
    pub soft_landing_threshold: f32,
    pub hard_landing_threshold: f32,
    pub soft_landing_duration: f32,
    pub hard_landing_duration: f32,

    pub tick: TickSettings,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            run_speed: 6.0,
            sprint_multiplier: 1.5,
            acceleration: 10.0,
            deceleration: 15.0,

            air_control: 0.3,
            air_drag: 0.1,
            gravity: 20.0,
            max_fall_speed: 50.0,

            jump_height: 2.0,
            jump_duration: 0.4,
            derive_gravity_from_jump_duration: false,
            jump_cut_multiplier: DEFAULT_JUMP_CUT_MULTIPLIER,
            use_variable_jump: true,
            coyote_time: 0.15,
            jump_buffer_time: 0.1,
            ceiling_check_distance: 0.1,

            ground_check_distance: 0.2,
            ground_check_radius: 0.3,
            ground_layers: LayerMask::from_flags(&[CollisionLayer::Default, CollisionLayer::Ground]),
            max_slope_angle: 45.0,

            max_step_height: 0.3,
            min_step_depth: 0.1,

            ledge_detection_enabled: true,
            max_stable_distance_from_ledge: 0.5,
            max_stable_denivelation_angle: 60.0,
            max_velocity_for_ledge_snap: 0.0,

            slope_slide_speed: 8.0,
            use_slope_dependent_slide_speed: true,
            use_slope_speed_modifier: false,
            uphill_speed_penalty: 0.7,
            downhill_speed_bonus: 1.2,

            rotation_speed: 720.0,
            rotate_towards_movement: true,

            soft_landing_threshold: 5.0,
            hard_landing_threshold: 15.0,
            soft_landing_duration: 0.1,
            hard_landing_duration: 0.4,

            tick: TickSettings::default(),
        }
    }
}

/// A config that passed validation, with the warnings it produced.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub config: MovementConfig,
    pub warnings: Vec<ConfigWarning>,
}

impl MovementConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Speed modifier for running, relative to walk speed.
    #[inline]
    pub fn run_modifier(&self) -> f32 {
        self.run_speed / self.walk_speed
    }

    #[inline]
    pub fn sprint_modifier(&self) -> f32 {
        self.run_modifier() * self.sprint_multiplier
    }

    #[inline]
    pub fn jump_impulse(&self) -> f32 {
        if self.derive_gravity_from_jump_duration && self.jump_duration > 0.0 {
            jump::velocity_for_duration(self.jump_height, self.jump_duration)
        } else {
            jump::impulse(self.jump_height, self.gravity)
        }
    }

    /// Checks every field, corrects the recoverable ones and logs each warning once.
    pub fn validate(mut self) -> Result<ValidatedConfig, ConfigError> {
        check_positive("jump_height", self.jump_height)?;
        if self.derive_gravity_from_jump_duration {
            check_positive("jump_duration", self.jump_duration)?;
            self.gravity = jump::gravity_for_duration(self.jump_height, self.jump_duration);
            log::debug!(
                "[MovementConfig] gravity {:.2} derived from a {:.2} s jump",
                self.gravity,
                self.jump_duration
            );
        }
        check_positive("walk_speed", self.walk_speed)?;
        check_positive("run_speed", self.run_speed)?;
        check_positive("sprint_multiplier", self.sprint_multiplier)?;
        check_positive("acceleration", self.acceleration)?;
        check_positive("deceleration", self.deceleration)?;
        check_positive("gravity", self.gravity)?;
        check_positive("max_fall_speed", self.max_fall_speed)?;
        check_unit("air_control", self.air_control)?;
        check_unit("air_drag", self.air_drag)?;
        check_unit("jump_cut_multiplier", self.jump_cut_multiplier)?;
        check_non_negative("coyote_time", self.coyote_time)?;
        check_non_negative("jump_buffer_time", self.jump_buffer_time)?;
        check_non_negative("ceiling_check_distance", self.ceiling_check_distance)?;
        check_non_negative("ground_check_radius", self.ground_check_radius)?;
        check_non_negative("max_step_height", self.max_step_height)?;
        check_non_negative("min_step_depth", self.min_step_depth)?;
        check_non_negative(
            "max_stable_distance_from_ledge",
            self.max_stable_distance_from_ledge,
        )?;
        check_non_negative(
            "max_velocity_for_ledge_snap",
            self.max_velocity_for_ledge_snap,
        )?;
        check_non_negative("slope_slide_speed", self.slope_slide_speed)?;
        check_non_negative("uphill_speed_penalty", self.uphill_speed_penalty)?;
        check_non_negative("downhill_speed_bonus", self.downhill_speed_bonus)?;
        check_non_negative("rotation_speed", self.rotation_speed)?;
        check_non_negative("soft_landing_threshold", self.soft_landing_threshold)?;
        check_non_negative("hard_landing_threshold", self.hard_landing_threshold)?;
        check_non_negative("soft_landing_duration", self.soft_landing_duration)?;
        check_non_negative("hard_landing_duration", self.hard_landing_duration)?;
        check_degrees("max_slope_angle", self.max_slope_angle)?;
        check_degrees(
            "max_stable_denivelation_angle",
            self.max_stable_denivelation_angle,
        )?;
        if self.tick.tick_rate == 0 {
            return Err(ConfigError::invalid("tick.tick_rate", "must be positive"));
        }

        let mut warnings = Vec::new();

        if self.walk_speed > self.run_speed {
            warnings.push(ConfigWarning::WalkFasterThanRun {
                walk: self.walk_speed,
                run: self.run_speed,
            });
        }
        if !(self.ground_check_distance > 0.0) {
            warnings.push(ConfigWarning::GroundCheckDistanceCorrected {
                given: self.ground_check_distance,
                used: FALLBACK_GROUND_CHECK_DISTANCE,
            });
            self.ground_check_distance = FALLBACK_GROUND_CHECK_DISTANCE;
        }
        if self.ground_layers.is_empty() {
            warnings.push(ConfigWarning::EmptyGroundLayers);
        }
        if !(self.jump_duration > 0.0) {
            warnings.push(ConfigWarning::NonPositiveJumpDuration(self.jump_duration));
        }
        if self.hard_landing_threshold < self.soft_landing_threshold {
            warnings.push(ConfigWarning::LandingThresholdsInverted {
                soft: self.soft_landing_threshold,
                hard: self.hard_landing_threshold,
            });
        }
        let clamped = self.tick.clamped();
        if clamped != self.tick {
            warnings.push(ConfigWarning::TickSettingsClamped {
                given: self.tick,
                used: clamped,
            });
            self.tick = clamped;
        }

        for w in &warnings {
            log::warn!("[MovementConfig] {w}");
        }

        Ok(ValidatedConfig {
            config: self,
            warnings,
        })
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is not finite")))
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be > 0")))
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be >= 0")))
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be in [0, 1]")))
    }
}

fn check_degrees(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if (0.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be in [0, 90]")))
    }
}
