/// Simulation clock for the fixed timestep loop
///
/// The host calls `begin_frame` once per render callback with its own
/// timestamp. Elapsed time goes into an accumulator and is paid out in
/// fixed steps, so the simulation advances at the same rate regardless of
/// how unevenly the host calls in. Leftover sub-step time is carried into
/// the next call instead of being dropped.
use crate::core::math::{tolerant_floor, FRAME_EPSILON};

use super::config::DEFAULT_TIMESTEP_MS;

/// Default cap on catch-up steps per call to prevent spiral of death
pub const DEFAULT_MAX_STEPS: u32 = 5;

/// Fixed timestep accumulator driven by caller-supplied timestamps (ms)
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    /// Length of one fixed step (ms)
    step_ms: f64,

    /// Maximum number of steps paid out by a single `begin_frame`
    max_steps: u32,

    /// Time owed to the simulation but not yet stepped (ms)
    accumulator: f64,

    /// Timestamp passed to the previous `begin_frame`
    last_update: Option<f64>,

    /// Whether `begin_frame` advances the simulation
    running: bool,

    /// Number of `begin_frame` calls while running
    frame_count: u64,

    /// Total fixed steps paid out
    update_count: u64,
}

impl FixedStepClock {
    /// Create a stopped clock
    pub fn new(step_ms: f64, max_steps: u32) -> Self {
        Self {
            step_ms,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            last_update: None,
            running: false,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Begin a new host frame, returns the number of fixed steps to run
    ///
    /// The first call after `start` only records the timestamp.
    pub fn begin_frame(&mut self, current_time: f64) -> u32 {
        if !self.running || !current_time.is_finite() {
            return 0;
        }
        self.frame_count += 1;

        let Some(last) = self.last_update.replace(current_time) else {
            return 0;
        };

        // A clock that runs backwards owes nothing
        self.accumulator += (current_time - last).max(0.0);

        let mut updates = 0;
        while self.accumulator + FRAME_EPSILON >= self.step_ms
            && updates < self.max_steps
        {
            self.accumulator = (self.accumulator - self.step_ms).max(0.0);
            updates += 1;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Number of whole steps in `delta_ms`, ignoring the running state.
    /// The sub-step remainder is discarded.
    pub fn direct_steps(&mut self, delta_ms: f64) -> u32 {
        if !delta_ms.is_finite() || delta_ms <= 0.0 {
            return 0;
        }
        let steps = tolerant_floor(delta_ms / self.step_ms) as u32;
        self.update_count += steps as u64;
        steps
    }

    /// Length of one fixed step (ms)
    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Interpolation alpha between the last step and the next one
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.step_ms).min(1.0)
    }

    /// Time owed to the simulation but not yet stepped (ms)
    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Get total number of host frames seen while running
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of fixed steps paid out
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Check if the clock is advancing
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start advancing; the next `begin_frame` re-anchors the timestamp
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            // Reset accumulator to prevent update burst
            self.accumulator = 0.0;
            self.last_update = None;
            log::info!("Simulation started");
        }
    }

    /// Stop advancing; existing state is kept
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::info!("Simulation stopped");
        }
    }
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTEP_MS, DEFAULT_MAX_STEPS)
    }
}
