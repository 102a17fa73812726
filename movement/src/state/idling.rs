use super::{MovementState, StateContext, StateId, grounded};

/// Standing still. Any remaining horizontal velocity decelerates to zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdlingState;

impl MovementState for IdlingState {
    fn id(&self) -> StateId {
        StateId::Idling
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) {
        grounded::enter(ctx);
        ctx.data.movement_speed_modifier = 0.0;
    }

    fn handle_input(&mut self, ctx: &mut StateContext<'_>) -> Option<StateId> {
        grounded::jump_requested(ctx).or_else(|| match grounded::movement_state(ctx) {
            StateId::Idling => None,
            next => Some(next),
        })
    }

    fn update(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateId> {
        grounded::track_ground(ctx, dt)
    }
}
