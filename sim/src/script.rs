use movement::{InputSnapshot, Vec3};

use crate::scene::{RAMP_LANE_X, STAIR_LANE_X, STEEP_LANE_X};

/// Frame times cycled by the host loop: a jittery mix around 60 fps with an occasional stall.
pub const FRAME_TIMES: [f32; 8] = [
    1.0 / 60.0,
    1.0 / 144.0,
    1.0 / 30.0,
    1.0 / 90.0,
    0.004,
    1.0 / 60.0,
    0.2,
    1.0 / 75.0,
];

/// Scripted driver for one demo character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bot {
    /// Climbs the stairs and runs off the landing, jumping every few seconds.
    StairRunner,
    /// Walks up the gentle ramp, then sprints back.
    RampWalker,
    /// Pushes into the steep ramp and slides off it.
    SlopeClimber,
    /// Dropped from high up, stands through the hard landing, then hops in place.
    Dropper,
}

impl Bot {
    pub const ALL: [Bot; 4] = [
        Bot::StairRunner,
        Bot::RampWalker,
        Bot::SlopeClimber,
        Bot::Dropper,
    ];

    pub fn spawn(self) -> Vec3 {
        match self {
            Bot::StairRunner => Vec3::new(STAIR_LANE_X, 0.0, 0.0),
            Bot::RampWalker => Vec3::new(RAMP_LANE_X, 0.0, 0.0),
            Bot::SlopeClimber => Vec3::new(STEEP_LANE_X, 0.0, 8.0),
            Bot::Dropper => Vec3::new(-14.0, 8.0, 4.0),
        }
    }

    /// Input for the frame starting at `t` seconds.
    pub fn input(self, t: f32) -> InputSnapshot {
        let forward = InputSnapshot::default()
            .with_move(0.0, 1.0)
            .with_look(Vec3::z());
        match self {
            Bot::StairRunner => {
                let phase = t % 4.0;
                if t > 6.0 {
                    InputSnapshot::default()
                } else if phase < 0.05 && t > 1.0 {
                    forward.pressing_jump()
                } else if phase < 0.3 && t > 1.0 {
                    forward.holding_jump()
                } else {
                    forward
                }
            }
            Bot::RampWalker => {
                if t < 0.05 {
                    forward.toggling_walk()
                } else if t < 5.0 {
                    forward
                } else if t < 5.05 {
                    InputSnapshot::default()
                        .with_move(0.0, -1.0)
                        .with_look(Vec3::z())
                        .toggling_walk()
                        .sprinting()
                } else if t < 7.0 {
                    InputSnapshot::default()
                        .with_move(0.0, -1.0)
                        .with_look(Vec3::z())
                        .sprinting()
                } else {
                    InputSnapshot::default()
                }
            }
            Bot::SlopeClimber => {
                if t < 3.0 {
                    forward.sprinting()
                } else {
                    InputSnapshot::default()
                }
            }
            Bot::Dropper => {
                let phase = t % 1.5;
                if t < 3.0 {
                    InputSnapshot::default()
                } else if phase < 0.05 {
                    InputSnapshot::default().pressing_jump()
                } else {
                    InputSnapshot::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_times_mix_fast_and_slow_frames() {
        let mean = FRAME_TIMES.iter().sum::<f32>() / FRAME_TIMES.len() as f32;
        assert!(mean > 1.0 / 60.0 && mean < 0.05);
    }

    #[test]
    fn stair_runner_first_jump_comes_after_four_seconds() {
        let presses = (0..400)
            .map(|i| i as f32 * 0.01)
            .filter(|t| Bot::StairRunner.input(*t).jump_pressed)
            .count();
        // The press window at t = 0 is skipped, so nothing before t = 4.
        assert_eq!(presses, 0);
        let presses = (0..600)
            .map(|i| i as f32 * 0.01)
            .filter(|t| Bot::StairRunner.input(*t).jump_pressed)
            .count();
        assert!(presses >= 1);
    }
}
