use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Validated parameters of one simulation run. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // Grid
    pub width: u32,
    pub height: u32,

    // Disease
    pub density: f64,        // Initial infection probability per agent
    pub infection_rate: f64, // Per infected neighbor, per step
    pub healing_rate: f64,   // Per infected agent, per step
    pub immunization_time: u64, // Steps before immunity expires

    // Random stream
    pub seed: u64,
    /// Whether snapshots carry every agent's position.
    pub record_positions: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            width: 20,
            height: 20,
            density: 0.8,
            infection_rate: 0.1,
            healing_rate: 0.05,
            immunization_time: 100,
            seed: 0,
            record_positions: true,
        }
    }
}

impl SimParams {
    /// Builds parameters for a `width x height` grid, validating every field.
    pub fn new(
        height: u32,
        width: u32,
        density: f64,
        infection_rate: f64,
        healing_rate: f64,
        immunization_time: u64,
    ) -> Result<Self, SimError> {
        let params = SimParams {
            width,
            height,
            density,
            infection_rate,
            healing_rate,
            immunization_time,
            ..SimParams::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_record_positions(mut self, record: bool) -> Self {
        self.record_positions = record;
        self
    }

    /// Number of agents; the grid is always fully occupied.
    pub fn population(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Rejects non-positive dimensions and rates outside [0, 1]. Nothing is clamped.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 {
            return Err(SimError::invalid("width", "must be greater than 0"));
        }
        if self.height == 0 {
            return Err(SimError::invalid("height", "must be greater than 0"));
        }
        check_unit_interval("density", self.density)?;
        check_unit_interval("infection_rate", self.infection_rate)?;
        check_unit_interval("healing_rate", self.healing_rate)?;
        Ok(())
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), SimError> {
    // NaN fails the range check as well
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::invalid(name, format!("{value} is not within [0, 1]")))
    }
}
