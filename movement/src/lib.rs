pub mod bitmask_flags;
pub mod character;
pub mod collision;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod input;
pub mod locomotion;
pub mod modules;
pub mod motor;
pub mod registry;
pub mod state;
pub mod tick;
pub mod types;
pub mod utils;

pub use bitmask_flags::{CollisionFlag, CollisionFlags, CollisionLayer, LayerMask};
pub use character::{Character, CharacterBuilder, CharacterSnapshot, MovementController};
pub use collision::{CastHit, ColliderShapeDef, CollisionWorld, SpatialQuery, WorldStaticDef};
pub use config::{MovementConfig, ValidatedConfig};
pub use data::{MovementIntents, ReusableData};
pub use error::{ConfigError, ConfigWarning, ConstructionError, StateMachineError, TickError};
pub use input::{InputLatch, InputSnapshot};
pub use locomotion::{CharacterLocomotion, LocomotionInput, LocomotionOutput};
pub use motor::{CharacterMotor, GroundInfo, MotorSettings, StabilityReport};
pub use registry::{CharacterId, CharacterRegistry};
pub use state::{MovementStateMachine, StateHistory, StateHistoryEntry, StateId, TransitionReason};
pub use tick::{TickClock, TickSettings};
pub use types::{CapsuleSpec, Quat, Vec2, Vec3};
