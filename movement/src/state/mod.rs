/*!
Movement decisions.

States decide *what* should happen and *when* to change state. They never touch velocity:
their only outputs are the speed modifier, a handful of bookkeeping fields in
[`ReusableData`], and one-shot [`MovementIntents`](crate::data::MovementIntents) that locomotion
consumes.

States are registered by [`StateId`] in a [`MovementStateMachine`] and request transitions by
returning the id of the next state, so no state holds a reference to another. Per-activation
timers live in [`StateLocals`], owned by the machine and reset on every enter.

Families
- Grounded: `Idling`, `Walking`, `Running`, `Sprinting`, `SoftLanding`, `HardLanding`.
- Airborne: `Jumping`, `Falling`.
*/

mod airborne;
mod falling;
mod grounded;
mod history;
mod idling;
mod jumping;
mod landing;
mod machine;
mod moving;

pub use falling::FallingState;
pub use history::{StateHistory, StateHistoryEntry, TransitionReason};
pub use idling::IdlingState;
pub use jumping::JumpingState;
pub use landing::{HardLandingState, SoftLandingState, recovery_duration};
pub use machine::MovementStateMachine;
pub use moving::MovingState;

use std::fmt;

use crate::config::MovementConfig;
use crate::data::ReusableData;
use crate::motor::GroundInfo;
use crate::types::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateId {
    Idling,
    Walking,
    Running,
    Sprinting,
    Jumping,
    Falling,
    SoftLanding,
    HardLanding,
}

impl StateId {
    pub const ALL: [StateId; 8] = [
        StateId::Idling,
        StateId::Walking,
        StateId::Running,
        StateId::Sprinting,
        StateId::Jumping,
        StateId::Falling,
        StateId::SoftLanding,
        StateId::HardLanding,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StateId::Idling => "Idling",
            StateId::Walking => "Walking",
            StateId::Running => "Running",
            StateId::Sprinting => "Sprinting",
            StateId::Jumping => "Jumping",
            StateId::Falling => "Falling",
            StateId::SoftLanding => "SoftLanding",
            StateId::HardLanding => "HardLanding",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    pub fn is_grounded(self) -> bool {
        !self.is_airborne()
    }

    pub fn is_airborne(self) -> bool {
        matches!(self, StateId::Jumping | StateId::Falling)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the state layer may observe about the body. Read-only.
pub trait Sensors {
    /// Feet position.
    fn position(&self) -> Vec3;

    /// Ground classification from the last motor move.
    fn ground(&self) -> GroundInfo;

    /// Something solid within `distance` above the head.
    fn ceiling_hit(&self, distance: f32) -> bool;
}

/// Per-activation state memory. Reset whenever a state is entered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateLocals {
    /// Seconds since enter.
    pub state_time: f32,
    /// Remaining jump buffer window, seconds.
    pub jump_buffer: f32,
    /// A jump press is waiting for the landing recovery to end.
    pub jump_buffered: bool,
    /// Locomotion applied the jump impulse.
    pub impulse_confirmed: bool,
    /// The early-release jump cut was already requested.
    pub jump_cut_done: bool,
    /// Remaining landing recovery, seconds.
    pub recovery: f32,
}

pub struct StateContext<'a> {
    pub data: &'a mut ReusableData,
    pub config: &'a MovementConfig,
    pub sensors: &'a dyn Sensors,
    pub locals: &'a mut StateLocals,
}

/// A node of the movement state graph.
///
/// Every hook returns the id of the state to switch to, if any. The machine runs the exit and
/// enter hooks and records the transition.
pub trait MovementState: fmt::Debug {
    fn id(&self) -> StateId;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    fn enter(&mut self, _ctx: &mut StateContext<'_>) {}

    fn exit(&mut self, _ctx: &mut StateContext<'_>) {}

    fn handle_input(&mut self, _ctx: &mut StateContext<'_>) -> Option<StateId> {
        None
    }

    fn update(&mut self, _ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateId> {
        None
    }

    fn physics_update(&mut self, _ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateId> {
        None
    }
}

/// The full default state graph.
pub fn default_states() -> Vec<Box<dyn MovementState>> {
    vec![
        Box::new(IdlingState),
        Box::new(MovingState::new(StateId::Walking)),
        Box::new(MovingState::new(StateId::Running)),
        Box::new(MovingState::new(StateId::Sprinting)),
        Box::new(JumpingState),
        Box::new(FallingState),
        Box::new(SoftLandingState),
        Box::new(HardLandingState),
    ]
}
