//! Frame clock with fixed-timestep accumulator

use std::time::Instant;
use tempo_core::{ClockConfig, Result, TempoError};

/// Tracks frame time for a host loop and tells it how many fixed-update
/// dispatches each frame owes.
///
/// ```ignore
/// clock.tick();
/// while clock.should_fixed_update() {
///     dispatcher.dispatch_fixed_update();
///     clock.consume_fixed_step();
/// }
/// dispatcher.dispatch_update();
/// dispatcher.dispatch_late_update();
/// ```
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Fixed timestep interval (default: 1/60 second)
    pub fixed_timestep: f64,
    /// Longest delta accepted per frame
    max_frame_time: f64,
    /// Accumulated time for fixed-step consumption
    accumulator: f64,
    /// Frames advanced so far
    frame: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: 1.0 / 60.0,
            max_frame_time: 0.25,
            accumulator: 0.0,
            frame: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    /// Create a new frame clock with default 60Hz fixed timestep
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame clock with a custom fixed timestep
    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ClockConfig) -> Result<Self> {
        if !(config.fixed_hz > 0.0) {
            return Err(TempoError::ValueOutOfRange {
                field: "clock.fixed_hz".into(),
                min: 0.0,
                max: f64::MAX,
                value: config.fixed_hz,
            });
        }
        if !(config.max_frame_time > 0.0) {
            return Err(TempoError::ValueOutOfRange {
                field: "clock.max_frame_time".into(),
                min: 0.0,
                max: f64::MAX,
                value: config.max_frame_time,
            });
        }
        Ok(Self {
            fixed_timestep: 1.0 / config.fixed_hz,
            max_frame_time: config.max_frame_time,
            ..Self::default()
        })
    }

    /// Advance the clock from wall time. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            self.frame += 1;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by a known delta, for headless and deterministic hosts
    pub fn advance(&mut self, elapsed: f64) {
        self.first_tick = false;
        // Clamp to avoid spiral of death
        self.delta_time = elapsed.clamp(0.0, self.max_frame_time);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
        self.frame += 1;
    }

    /// Returns true if there's enough accumulated time for a fixed update step
    pub fn should_fixed_update(&self) -> bool {
        self.accumulator >= self.fixed_timestep
    }

    /// Consume one fixed timestep from the accumulator
    pub fn consume_fixed_step(&mut self) {
        self.accumulator -= self.fixed_timestep;
    }

    /// Get the interpolation alpha for rendering between fixed steps
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_timestep
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}
