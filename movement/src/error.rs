//! Error types.
//!
//! Probe misses (no ground, no step, no ceiling) are not errors; they are `Option`/`bool` results
//! produced every tick while airborne.

use thiserror::Error;

use crate::state::StateId;

/// Fatal configuration problems. A config that fails with one of these is never simulated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Non-fatal configuration issues. Reported once at validation; the simulation continues.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigWarning {
    #[error("walk speed ({walk}) is greater than run speed ({run})")]
    WalkFasterThanRun { walk: f32, run: f32 },

    #[error("ground check distance ({given}) must be positive, using {used}")]
    GroundCheckDistanceCorrected { given: f32, used: f32 },

    #[error("ground layer mask is empty, the character will never find ground")]
    EmptyGroundLayers,

    #[error("jump duration ({0}) should be positive")]
    NonPositiveJumpDuration(f32),

    #[error("hard landing threshold ({hard}) is below soft landing threshold ({soft})")]
    LandingThresholdsInverted { soft: f32, hard: f32 },

    #[error("tick settings {given:?} out of range, using {used:?}")]
    TickSettingsClamped {
        given: crate::tick::TickSettings,
        used: crate::tick::TickSettings,
    },
}

/// Raised while assembling a character. The character is not created.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("a collision capsule is required")]
    MissingCapsule,

    #[error("invalid capsule: {0}")]
    InvalidCapsule(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    #[error(transparent)]
    Tick(#[from] TickError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("state {0:?} is already registered")]
    DuplicateState(StateId),

    #[error("state {0:?} is not registered")]
    UnknownState(StateId),

    #[error("state machine has no active state")]
    NotInitialized,
}

#[derive(Debug, Error, PartialEq)]
pub enum TickError {
    #[error("tick rate must be positive, got {0}")]
    InvalidRate(u32),
}
