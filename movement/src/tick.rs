/*!
Fixed-rate tick clock.

Accumulates real frame time and emits a bounded number of discrete simulation ticks per update.

Behavior
- `update(real_dt, on_tick)` adds `real_dt` to the accumulator and, while a full tick is
  available and fewer than `max_ticks_per_frame` ticks ran, advances `current_tick` and invokes
  `on_tick(tick, delta)`.
- If more than two ticks of time remain after the loop, the backlog is clamped to one tick and a
  warning is logged. This bounds catch-up after a stall.
- Ticks are numbered from 1; `current_tick` is the last executed tick.

Determinism
- The accumulator is kept in `f64` so long sessions do not drift. The tick callback only ever
  sees the fixed `delta`, never the frame time.
*/

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_TICKS_PER_FRAME, DEFAULT_TICK_RATE, MAX_TICKS_PER_FRAME_RANGE, TICK_RATE_RANGE,
};
use crate::error::TickError;

/// Tick clock parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickSettings {
    /// Ticks per second. Expected in 20..=128.
    pub tick_rate: u32,
    /// Cap on ticks run by a single `update`. Expected in 1..=20.
    pub max_ticks_per_frame: u32,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
        }
    }
}

impl TickSettings {
    /// Copy with both values clamped into their supported ranges.
    pub fn clamped(self) -> Self {
        Self {
            tick_rate: self.tick_rate.clamp(TICK_RATE_RANGE.0, TICK_RATE_RANGE.1),
            max_ticks_per_frame: self
                .max_ticks_per_frame
                .clamp(MAX_TICKS_PER_FRAME_RANGE.0, MAX_TICKS_PER_FRAME_RANGE.1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TickClock {
    rate: u32,
    delta: f32,
    accumulator: f64,
    current_tick: u64,
    max_ticks_per_frame: u32,
    paused: bool,
}

impl TickClock {
    pub fn new(rate: u32) -> Result<Self, TickError> {
        Self::with_settings(TickSettings {
            tick_rate: rate,
            ..TickSettings::default()
        })
    }

    pub fn with_settings(settings: TickSettings) -> Result<Self, TickError> {
        if settings.tick_rate == 0 {
            return Err(TickError::InvalidRate(settings.tick_rate));
        }
        Ok(Self {
            rate: settings.tick_rate,
            delta: 1.0 / settings.tick_rate as f32,
            accumulator: 0.0,
            current_tick: 0,
            max_ticks_per_frame: settings.max_ticks_per_frame.max(1),
            paused: false,
        })
    }

    /// Advances the clock by `real_dt` seconds and runs the ticks that became due.
    ///
    /// Returns the number of ticks executed.
    pub fn update(&mut self, real_dt: f32, mut on_tick: impl FnMut(u64, f32)) -> u32 {
        if self.paused {
            return 0;
        }

        self.accumulator += f64::from(real_dt.max(0.0));
        let delta = f64::from(self.delta);

        let mut executed = 0;
        while self.accumulator >= delta && executed < self.max_ticks_per_frame {
            self.current_tick += 1;
            on_tick(self.current_tick, self.delta);
            self.accumulator -= delta;
            executed += 1;
        }

        if self.accumulator > delta * 2.0 {
            log::warn!(
                "[TickClock] {:.1} ms behind after {} ticks, dropping backlog",
                self.accumulator * 1000.0,
                executed
            );
            self.accumulator = delta;
        }

        executed
    }

    /// Advances one tick without consuming accumulated time. Returns the new tick.
    pub fn step(&mut self) -> u64 {
        self.current_tick += 1;
        self.current_tick
    }

    /// Rewinds or fast-forwards to `tick`, e.g. before re-simulating buffered inputs.
    pub fn set_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    pub fn reset(&mut self) {
        self.current_tick = 0;
        self.accumulator = 0.0;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    #[inline]
    pub fn rate(&self) -> u32 {
        self.rate
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Fraction of the next tick already accumulated, for render interpolation.
    pub fn interpolation_alpha(&self) -> f32 {
        (self.accumulator / f64::from(self.delta)) as f32
    }

    pub fn tick_to_time(&self, tick: u64) -> f64 {
        tick as f64 / f64::from(self.rate)
    }

    pub fn time_to_tick(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * f64::from(self.rate)).floor() as u64
    }

    /// Signed number of ticks from `from` to `to`.
    pub fn tick_difference(from: u64, to: u64) -> i64 {
        to as i64 - from as i64
    }
}
