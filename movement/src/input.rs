use crate::types::{Vec2, Vec3};

/// Player input sampled for one tick.
///
/// `move_vector.x` is strafe (+right) and `move_vector.y` is forward. `look_direction` is the
/// camera forward in world space; only its horizontal part is used.
///
/// `*_pressed` fields are edges: true only on the tick the button went down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSnapshot {
    pub move_vector: Vec2,
    pub look_direction: Vec3,
    pub jump_pressed: bool,
    pub jump_held: bool,
    pub sprint_held: bool,
    pub dash_pressed: bool,
    pub walk_toggle_pressed: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            move_vector: Vec2::zeros(),
            look_direction: Vec3::zeros(),
            jump_pressed: false,
            jump_held: false,
            sprint_held: false,
            dash_pressed: false,
            walk_toggle_pressed: false,
        }
    }
}

impl InputSnapshot {
    pub fn with_move(mut self, x: f32, y: f32) -> Self {
        self.move_vector = Vec2::new(x, y);
        self
    }

    pub fn with_look(mut self, look: Vec3) -> Self {
        self.look_direction = look;
        self
    }

    /// Press edge plus hold.
    pub fn pressing_jump(mut self) -> Self {
        self.jump_pressed = true;
        self.jump_held = true;
        self
    }

    pub fn holding_jump(mut self) -> Self {
        self.jump_held = true;
        self
    }

    pub fn sprinting(mut self) -> Self {
        self.sprint_held = true;
        self
    }

    pub fn toggling_walk(mut self) -> Self {
        self.walk_toggle_pressed = true;
        self
    }
}

/// Holds frame input until a tick consumes it.
///
/// A frame that runs no tick must not lose a button edge, and a frame that runs several ticks
/// must not replay it. Levels (stick, holds) always reflect the latest frame. Edges are OR-ed
/// across frames and cleared by the first tick that takes them.
#[derive(Clone, Debug, Default)]
pub struct InputLatch {
    latest: InputSnapshot,
    jump_pressed: bool,
    dash_pressed: bool,
    walk_toggle_pressed: bool,
}

impl InputLatch {
    pub fn push(&mut self, input: InputSnapshot) {
        self.jump_pressed |= input.jump_pressed;
        self.dash_pressed |= input.dash_pressed;
        self.walk_toggle_pressed |= input.walk_toggle_pressed;
        self.latest = input;
    }

    /// Input for the next tick. Pending edges are handed out once.
    pub fn take(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            jump_pressed: self.jump_pressed,
            dash_pressed: self.dash_pressed,
            walk_toggle_pressed: self.walk_toggle_pressed,
            ..self.latest
        };
        self.jump_pressed = false;
        self.dash_pressed = false;
        self.walk_toggle_pressed = false;
        snapshot
    }
}
