pub mod config;
pub mod error;
pub mod sim_params;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, GridConfig, DiseaseConfig, RunConfig, BatchConfig, OutputConfig};
pub use error::SimError;
pub use sim_params::SimParams;
pub use snapshot::Snapshot;
