/// Vertical velocity held while standing on stable ground (m/s).
///
/// A small constant downward push keeps the capsule glued to slopes and stair noses instead of
/// hovering, while staying far from the fall threshold.
pub const GROUNDING_VELOCITY: f32 = -2.0;

/// Fraction of upward velocity kept when the jump button is released early.
pub const DEFAULT_JUMP_CUT_MULTIPLIER: f32 = 0.5;

/// Squared magnitude below which a planar vector counts as "no input" / "no motion".
pub const INPUT_DEADZONE_SQ: f32 = 0.01;

/// Duration the motor ignores ground after a jump or an upward impulse (seconds).
pub const FORCE_UNGROUND_TIME: f32 = 0.1;

/// Time spent in the jump before the ceiling probe is trusted (seconds).
pub const CEILING_CHECK_DELAY: f32 = 0.05;

/// Fraction of the capsule radius used by the ceiling probe.
pub const CEILING_PROBE_RADIUS_SCALE: f32 = 0.9;

/// Default simulation rate (ticks per second).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Default cap on ticks executed by a single frame update.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 10;

/// Accepted range for configured tick rates.
pub const TICK_RATE_RANGE: (u32, u32) = (20, 128);

/// Accepted range for the per-frame tick cap.
pub const MAX_TICKS_PER_FRAME_RANGE: (u32, u32) = (1, 20);

/// Number of transitions kept by the state history ring buffer.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Ground-check distance applied when the configured value is not positive (meters).
pub const FALLBACK_GROUND_CHECK_DISTANCE: f32 = 0.1;

/// Minimum yaw change worth applying (radians).
pub const YAW_EPS: f32 = 1.0e-6;

/// Time the jump state waits for the impulse to show up in the vertical velocity (seconds).
pub const JUMP_CONFIRM_TIMEOUT: f32 = 0.2;
