use crate::config::MovementConfig;

use super::{MovementState, StateContext, StateId, grounded};

/// Walking, running or sprinting. One struct, registered once per gait.
#[derive(Clone, Copy, Debug)]
pub struct MovingState {
    id: StateId,
}

impl MovingState {
    /// `id` must be `Walking`, `Running` or `Sprinting`; anything else moves at walk speed.
    pub fn new(id: StateId) -> Self {
        Self { id }
    }

    /// Scale on walk speed for this gait.
    pub fn speed_modifier(&self, config: &MovementConfig) -> f32 {
        match self.id {
            StateId::Running => config.run_modifier(),
            StateId::Sprinting => config.sprint_modifier(),
            _ => 1.0,
        }
    }
}

impl MovementState for MovingState {
    fn id(&self) -> StateId {
        self.id
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        grounded::enter(ctx);
        ctx.data.movement_speed_modifier = self.speed_modifier(ctx.config);
    }

    fn handle_input(&mut self, ctx: &mut StateContext<'_>) -> Option<StateId> {
        if let Some(jump) = grounded::jump_requested(ctx) {
            return Some(jump);
        }
        let next = grounded::movement_state(ctx);
        (next != self.id).then_some(next)
    }

    fn update(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateId> {
        grounded::track_ground(ctx, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gait_modifiers() {
        let config = MovementConfig::default();
        assert_eq!(MovingState::new(StateId::Walking).speed_modifier(&config), 1.0);
        assert_eq!(MovingState::new(StateId::Running).speed_modifier(&config), 2.0);
        assert_eq!(MovingState::new(StateId::Sprinting).speed_modifier(&config), 3.0);
    }
}
