//! Stochastic epidemic simulation on a fully occupied toroidal grid.
//!
//! Each agent is susceptible, infected or immune. Every step, infected
//! agents may heal into timed immunity and susceptible agents may catch the
//! infection from their 8 Moore neighbors, all driven by one seeded random
//! stream per simulation. [`BatchRunner`] repeats independent runs to
//! estimate how often the outbreak dies out.

pub mod agent;
pub mod batch;
pub mod grid;
pub mod output;
pub mod rng;
pub mod simulation;
pub mod stats;

pub use agent::{Agent, Delta, Health};
pub use batch::{outcome_summary, BatchRunner, BatchSummary, TrialResult};
pub use grid::{Grid, Position};
pub use rng::RngSource;
pub use simulation::{ModelView, Simulation};
pub use stats::StatsCollector;

pub use epidemic_common::{SimError, SimParams, SimulationConfig, Snapshot};
