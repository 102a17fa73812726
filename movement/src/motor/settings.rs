/*!
Motor tolerances.

Distances are in meters. These are practical world-space tolerances rather than machine epsilons;
per-character tuning lives in [`MotorSettings`], built from the movement config.
*/

use crate::bitmask_flags::LayerMask;
use crate::config::MovementConfig;

/// Default separation kept between the capsule and any surface.
pub const DEFAULT_SKIN: f32 = 0.02;

/// Maximum slide iterations per move (handles corners).
pub const MAX_SLIDE_ITERATIONS: u32 = 4;

/// Squared motion below which a move is skipped.
pub const MIN_MOVE_SQ: f32 = 1.0e-8;

/// Smallest rise that counts as a step.
pub const MIN_STEP_CLEARANCE: f32 = 0.02;

/// Extra height above `max_step_height` the step probe starts from.
pub const STEP_PROBE_CLEARANCE: f32 = 0.05;

/// Minimum forward reach of the step probe past the obstacle contact.
pub const STEP_PROBE_MIN_DEPTH: f32 = 0.02;

/// Ground search distance when the character was not standing on stable ground.
///
/// Kept tiny so a falling character is only grounded by actual contact.
pub const GROUND_CONTACT_TOLERANCE: f32 = 0.02;

/// Smallest probe sphere radius.
pub const MIN_PROBE_RADIUS: f32 = 0.01;

/// Horizontal offset of the inner/outer ledge rays from the ground contact.
pub const LEDGE_PROBE_OFFSET: f32 = 0.05;

/// Height above the ground contact the ledge rays start from.
pub const LEDGE_PROBE_HEIGHT: f32 = 0.1;

/// Lateral contact offset below which the contact counts as directly underfoot.
pub const LEDGE_MIN_OFFSET: f32 = 0.01;

/// Per-character motor parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorSettings {
    pub max_slope_angle: f32,
    pub max_step_height: f32,
    pub min_step_depth: f32,
    pub ground_check_distance: f32,
    pub ground_check_radius: f32,
    pub ledge_detection_enabled: bool,
    pub max_stable_distance_from_ledge: f32,
    pub max_stable_denivelation_angle: f32,
    pub max_velocity_for_ledge_snap: f32,
    pub layers: LayerMask,
}

impl From<&MovementConfig> for MotorSettings {
    fn from(cfg: &MovementConfig) -> Self {
        Self {
            max_slope_angle: cfg.max_slope_angle,
            max_step_height: cfg.max_step_height,
            min_step_depth: cfg.min_step_depth,
            ground_check_distance: cfg.ground_check_distance,
            ground_check_radius: cfg.ground_check_radius,
            ledge_detection_enabled: cfg.ledge_detection_enabled,
            max_stable_distance_from_ledge: cfg.max_stable_distance_from_ledge,
            max_stable_denivelation_angle: cfg.max_stable_denivelation_angle,
            max_velocity_for_ledge_snap: cfg.max_velocity_for_ledge_snap,
            layers: cfg.ground_layers,
        }
    }
}

impl Default for MotorSettings {
    fn default() -> Self {
        Self::from(&MovementConfig::default())
    }
}
