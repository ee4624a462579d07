//! Simulation time keeping.

use crate::data::DataDirectory;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The default physics step in s.
pub const DEFAULT_STEP_SIZE: f64 = 3e-3;

/// The default interval between rendered frames in s.
pub const DEFAULT_RENDER_STEP_SIZE: f64 = 0.1;

/// The default end time in s.
pub const DEFAULT_END_TIME: f64 = 120.0;

/// The timing parameters of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// The physics step in s.
    pub step_size: f64,
    /// The interval between rendered frames in s.
    pub render_step_size: f64,
    /// The time at which the simulation stops, if any.
    pub end_time: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            render_step_size: DEFAULT_RENDER_STEP_SIZE,
            end_time: Some(DEFAULT_END_TIME),
        }
    }
}

impl SimulationConfig {
    /// Loads the config from a JSON file, filling missing fields with defaults.
    pub fn from_json_file(data: &DataDirectory, name: impl AsRef<Path>) -> Result<Self> {
        let config: Self = data.read_json(name)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(Error::config("simulation", "step_size must be positive"));
        }
        if !(self.render_step_size.is_finite() && self.render_step_size > 0.0) {
            return Err(Error::config(
                "simulation",
                "render_step_size must be positive",
            ));
        }
        if let Some(end) = self.end_time {
            if end.is_nan() || end < 0.0 {
                return Err(Error::config("simulation", "end_time must be non-negative"));
            }
        }
        Ok(())
    }
}

/// The clock shared by every component of a simulation.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    time: f64,
    step_size: f64,
    step_number: u64,
    /// Time and step number after the last step that was not `step_size` long.
    /// Fixed steps are counted from here.
    anchor: (f64, u64),
    /// Number of physics steps between rendered frames.
    render_steps: u64,
    end_time: Option<f64>,
}

impl SimulationClock {
    /// Creates a clock at time zero.
    ///
    /// # Parameters
    /// * `step_size` - The physics step in s.
    /// * `render_step_size` - The interval between rendered frames in s. Rounded
    ///   to a whole number of physics steps, at least one.
    /// * `end_time` - When the simulation should stop, if ever.
    pub fn new(step_size: f64, render_step_size: f64, end_time: Option<f64>) -> Result<Self> {
        Self::from_config(&SimulationConfig {
            step_size,
            render_step_size,
            end_time,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let render_steps = (config.render_step_size / config.step_size).round().max(1.0) as u64;
        Ok(Self {
            time: 0.0,
            step_size: config.step_size,
            step_number: 0,
            anchor: (0.0, 0),
            render_steps,
            end_time: config.end_time,
        })
    }

    /// The current time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The fixed physics step in s.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// The number of steps taken so far.
    pub fn step_number(&self) -> u64 {
        self.step_number
    }

    /// The interval between rendered frames in s.
    pub fn render_step_size(&self) -> f64 {
        self.render_steps as f64 * self.step_size
    }

    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Moves time forward by `step` seconds.
    pub fn advance(&mut self, step: f64) -> Result<()> {
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::InvalidStep(step));
        }
        self.step_number += 1;
        if step == self.step_size {
            // Multiplying avoids accumulating rounding error over long runs
            let (anchor_time, anchor_step) = self.anchor;
            self.time = anchor_time + (self.step_number - anchor_step) as f64 * self.step_size;
        } else {
            self.time += step;
            self.anchor = (self.time, self.step_number);
        }
        Ok(())
    }

    /// False once the end time has been reached.
    pub fn is_ok(&self) -> bool {
        match self.end_time {
            Some(end) => self.time < end,
            None => true,
        }
    }

    /// True on steps where a frame should be rendered.
    pub fn should_render(&self) -> bool {
        self.step_number % self.render_steps == 0
    }

    /// A copy rewound to time zero that never ends, for components that keep
    /// their own count of steps.
    pub(crate) fn restarted(&self) -> Self {
        Self {
            time: 0.0,
            step_number: 0,
            anchor: (0.0, 0),
            end_time: None,
            ..self.clone()
        }
    }

    pub(crate) fn with_render_steps(mut self, render_steps: u64) -> Self {
        self.render_steps = render_steps.max(1);
        self
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        let config = SimulationConfig::default();
        Self {
            time: 0.0,
            step_size: config.step_size,
            step_number: 0,
            anchor: (0.0, 0),
            render_steps: (config.render_step_size / config.step_size).round() as u64,
            end_time: config.end_time,
        }
    }
}
