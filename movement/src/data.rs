/*!
Tick-scoped shared data.

[`ReusableData`] is written by input at the start of a tick, read and written by the active
state, then read by locomotion. After locomotion the owning character syncs the resulting
velocities and ground status back in for the next tick.

One-shot requests from the state layer travel through [`MovementIntents`]. States may only raise
them; only locomotion can take (read and clear) them, which the `pub(crate)` visibility of the
`take_*` methods enforces.
*/

use crate::input::InputSnapshot;
use crate::types::{Vec2, Vec3, up};

/// One-shot requests from the state layer to locomotion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementIntents {
    jump: bool,
    jump_cut: bool,
    reset_vertical: bool,
}

impl MovementIntents {
    /// Requests a jump impulse. Supersedes a pending cut or reset from the same tick.
    pub fn request_jump(&mut self) {
        self.jump = true;
        self.jump_cut = false;
        self.reset_vertical = false;
    }

    pub fn request_jump_cut(&mut self) {
        self.jump_cut = true;
    }

    /// Zeroes vertical velocity, e.g. after a ceiling hit.
    pub fn request_reset_vertical(&mut self) {
        self.reset_vertical = true;
    }

    #[inline]
    pub fn jump_pending(&self) -> bool {
        self.jump
    }

    #[inline]
    pub fn jump_cut_pending(&self) -> bool {
        self.jump_cut
    }

    #[inline]
    pub fn reset_vertical_pending(&self) -> bool {
        self.reset_vertical
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.jump || self.jump_cut || self.reset_vertical)
    }

    pub(crate) fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump)
    }

    pub(crate) fn take_jump_cut(&mut self) -> bool {
        std::mem::take(&mut self.jump_cut)
    }

    pub(crate) fn take_reset_vertical(&mut self) -> bool {
        std::mem::take(&mut self.reset_vertical)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReusableData {
    // Input
    pub move_input: Vec2,
    pub look_direction: Vec3,
    pub jump_pressed: bool,
    pub jump_held: bool,
    pub sprint_held: bool,
    pub dash_pressed: bool,
    pub walk_toggle_pressed: bool,
    /// Walk instead of run. Flipped by the walk toggle.
    pub should_walk: bool,

    // Velocity
    pub vertical_velocity: f32,
    pub horizontal_velocity: Vec3,
    /// Scale on walk speed chosen by the active state.
    pub movement_speed_modifier: f32,

    // Ground
    /// Walkable ground found this tick.
    pub is_grounded: bool,
    pub ground_snapping_prevented: bool,
    /// Gap to walkable ground within step reach, `INFINITY` if none.
    pub ground_distance: f32,
    pub is_sliding: bool,
    pub time_since_grounded: f32,
    /// Feet height when last grounded. Reference for coyote time and fall distance.
    pub last_grounded_height: f32,
    pub step_detection_enabled: bool,

    // Jump bookkeeping
    /// The jump button was released since the last jump.
    pub jump_was_released: bool,
    pub left_ground_by_jump: bool,
    /// Impact speed of the last landing, derived from fall distance.
    pub landing_velocity: f32,

    pub intents: MovementIntents,
    pub current_tick: u64,
}

impl Default for ReusableData {
    fn default() -> Self {
        Self {
            move_input: Vec2::zeros(),
            look_direction: Vec3::zeros(),
            jump_pressed: false,
            jump_held: false,
            sprint_held: false,
            dash_pressed: false,
            walk_toggle_pressed: false,
            should_walk: false,
            vertical_velocity: 0.0,
            horizontal_velocity: Vec3::zeros(),
            movement_speed_modifier: 1.0,
            is_grounded: false,
            ground_snapping_prevented: false,
            ground_distance: f32::INFINITY,
            is_sliding: false,
            time_since_grounded: 0.0,
            last_grounded_height: 0.0,
            step_detection_enabled: true,
            jump_was_released: true,
            left_ground_by_jump: false,
            landing_velocity: 0.0,
            intents: MovementIntents::default(),
            current_tick: 0,
        }
    }
}

impl ReusableData {
    /// Copies one tick of input in and updates input-derived bookkeeping.
    pub fn apply_input(&mut self, input: &InputSnapshot) {
        self.move_input = input.move_vector;
        self.look_direction = input.look_direction;
        self.jump_pressed = input.jump_pressed;
        self.jump_held = input.jump_held;
        self.sprint_held = input.sprint_held;
        self.dash_pressed = input.dash_pressed;
        self.walk_toggle_pressed = input.walk_toggle_pressed;

        if input.walk_toggle_pressed {
            self.should_walk = !self.should_walk;
        }
        if !input.jump_held {
            self.jump_was_released = true;
        }
    }

    #[inline]
    pub fn has_move_input(&self) -> bool {
        self.move_input.norm_squared() > crate::constants::INPUT_DEADZONE_SQ
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.horizontal_velocity + up() * self.vertical_velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_supersedes_cut_and_reset() {
        let mut intents = MovementIntents::default();
        intents.request_jump_cut();
        intents.request_reset_vertical();
        intents.request_jump();
        assert!(intents.jump_pending());
        assert!(!intents.jump_cut_pending());
        assert!(!intents.reset_vertical_pending());
    }

    #[test]
    fn intents_are_taken_once() {
        let mut intents = MovementIntents::default();
        intents.request_jump();
        assert!(intents.take_jump());
        assert!(!intents.take_jump());
        assert!(intents.is_empty());
    }

    #[test]
    fn walk_toggle_flips_and_release_is_tracked() {
        let mut data = ReusableData {
            jump_was_released: false,
            ..ReusableData::default()
        };
        data.apply_input(&InputSnapshot::default().toggling_walk().holding_jump());
        assert!(data.should_walk);
        assert!(!data.jump_was_released);

        data.apply_input(&InputSnapshot::default());
        assert!(data.should_walk);
        assert!(data.jump_was_released);

        data.apply_input(&InputSnapshot::default().toggling_walk());
        assert!(!data.should_walk);
    }
}
