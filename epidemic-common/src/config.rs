use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use crate::sim_params::SimParams;
use std::path::Path;

// Grid extent; the lattice is always fully occupied
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GridConfig {
    #[serde(default = "default_side")]
    pub width: u32,
    #[serde(default = "default_side")]
    pub height: u32,
}

// Disease dynamics, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DiseaseConfig {
    #[serde(default = "default_density")]
    pub density: f64,
    #[serde(default = "default_infection_rate")]
    pub infection_rate: f64,
    #[serde(default = "default_healing_rate")]
    pub healing_rate: f64,
    #[serde(default = "default_immunization_time")]
    pub immunization_time: u64,
}

// Settings for a single run
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RunConfig {
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default)]
    pub seed: u64,
}

// Settings for a batch experiment
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BatchConfig {
    #[serde(default = "default_trials")]
    pub trials: u32,
    #[serde(default = "default_steps")]
    pub steps_per_trial: u32,
    /// Trial `i` is seeded with `base_seed + i`.
    #[serde(default)]
    pub base_seed: u64,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
    #[serde(default = "default_true")]
    pub save_stats: bool,
    #[serde(default = "default_true")]
    pub save_time_series: bool,
    #[serde(default)]
    pub save_positions_in_snapshot: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub disease: DiseaseConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file '{}'", path_ref.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid configuration in '{}'", path_ref.display()))
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .context("Failed to parse TOML")?;

        // Catch bad parameters at load time rather than at the first run
        config.get_sim_params(config.run.seed)?;
        if config.batch.trials == 0 {
            anyhow::bail!("batch.trials must be greater than 0.");
        }

        Ok(config)
    }

    /// Converts the configuration into validated run parameters for the given seed.
    pub fn get_sim_params(&self, seed: u64) -> Result<SimParams> {
        let params = SimParams::new(
            self.grid.height,
            self.grid.width,
            self.disease.density,
            self.disease.infection_rate,
            self.disease.healing_rate,
            self.disease.immunization_time,
        )?;
        Ok(params
            .with_seed(seed)
            .with_record_positions(self.output.save_positions_in_snapshot))
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { width: default_side(), height: default_side() }
    }
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        DiseaseConfig {
            density: default_density(),
            infection_rate: default_infection_rate(),
            healing_rate: default_healing_rate(),
            immunization_time: default_immunization_time(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { steps: default_steps(), seed: 0 }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig { trials: default_trials(), steps_per_trial: default_steps(), base_seed: 0 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: default_base_filename(),
            save_stats: true,
            save_time_series: true,
            save_positions_in_snapshot: false,
            format: None,
        }
    }
}

fn default_side() -> u32 {
    20
}

fn default_density() -> f64 {
    0.8
}

fn default_infection_rate() -> f64 {
    0.1
}

fn default_healing_rate() -> f64 {
    0.05
}

fn default_immunization_time() -> u64 {
    100
}

fn default_steps() -> u32 {
    1000
}

fn default_trials() -> u32 {
    100
}

fn default_base_filename() -> String {
    "epidemic".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config.grid.width, 20);
        assert_eq!(config.grid.height, 20);
        assert_eq!(config.disease.density, 0.8);
        assert_eq!(config.disease.immunization_time, 100);
        assert_eq!(config.batch.trials, 100);
        assert_eq!(config.batch.steps_per_trial, 1000);
        assert!(config.output.format.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let text = r#"
            [grid]
            width = 30
            height = 10

            [disease]
            density = 0.01
            infection_rate = 0.3

            [run]
            steps = 50
            seed = 7

            [output]
            format = "bincode"
            save_positions_in_snapshot = true
        "#;
        let config = SimulationConfig::from_toml_str(text).unwrap();
        let params = config.get_sim_params(config.run.seed).unwrap();
        assert_eq!(params.width, 30);
        assert_eq!(params.height, 10);
        assert_eq!(params.density, 0.01);
        assert_eq!(params.infection_rate, 0.3);
        assert_eq!(params.healing_rate, 0.05);
        assert_eq!(params.seed, 7);
        assert!(params.record_positions);
        assert_eq!(config.run.steps, 50);
        assert_eq!(config.output.format.as_deref(), Some("bincode"));
    }

    #[test]
    fn invalid_rate_is_rejected_at_load() {
        let err = SimulationConfig::from_toml_str("[disease]\nhealing_rate = 1.2\n").unwrap_err();
        assert!(format!("{err:#}").contains("healing_rate"));
    }

    #[test]
    fn zero_trials_is_rejected() {
        assert!(SimulationConfig::from_toml_str("[batch]\ntrials = 0\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SimulationConfig::load("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
