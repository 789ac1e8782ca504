use crate::simulation::Simulation;
use epidemic_common::{SimError, SimParams, Snapshot};
use indicatif::ProgressBar;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

/// Outcome of one independent trial.
#[derive(Debug, Clone)]
pub struct TrialResult {
    pub trial: u32,
    pub seed: u64,
    /// Full time series, initial snapshot included.
    pub series: Vec<Snapshot>,
}

impl TrialResult {
    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.series.last()
    }

    /// True if nobody is infected at the horizon.
    pub fn virus_defeated(&self) -> bool {
        self.final_snapshot().is_some_and(Snapshot::is_infection_free)
    }
}

/// Runs independent simulations with the same parameters and different seeds.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pub trials: u32,
    pub steps_per_trial: u32,
    /// Trial `i` runs with seed `base_seed + i`.
    pub base_seed: u64,
    /// Per-agent positions in every snapshot; off by default to bound memory.
    pub record_positions: bool,
}

impl BatchRunner {
    pub fn new(trials: u32, steps_per_trial: u32) -> Self {
        Self { trials, steps_per_trial, base_seed: 0, record_positions: false }
    }

    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    pub fn with_record_positions(mut self, record: bool) -> Self {
        self.record_positions = record;
        self
    }

    /// Runs every trial (in parallel) and returns the results ordered by trial index.
    ///
    /// Trials share nothing, so the results do not depend on scheduling.
    pub fn run(&self, params: &SimParams, progress: Option<&ProgressBar>) -> Result<Vec<TrialResult>, SimError> {
        params.validate()?;
        info!(
            "Running {} trials of {} steps on a {}x{} grid.",
            self.trials, self.steps_per_trial, params.width, params.height
        );

        (0..self.trials)
            .into_par_iter()
            .map(|trial| -> Result<TrialResult, SimError> {
                let seed = self.base_seed.wrapping_add(u64::from(trial));
                let trial_params = params
                    .clone()
                    .with_seed(seed)
                    .with_record_positions(self.record_positions);

                let mut sim = Simulation::new(trial_params)?;
                sim.run(self.steps_per_trial);
                debug!(
                    "Trial {} (seed {}) finished: infected={}, immune={}",
                    trial,
                    seed,
                    sim.infected_count(),
                    sim.immune_count()
                );

                if let Some(pb) = progress {
                    pb.inc(1);
                }
                Ok(TrialResult { trial, seed, series: sim.into_stats().into_series() })
            })
            .collect()
    }
}

/// Percentage (0 to 100) of trials with no infected agent at the horizon.
/// An empty batch yields 0.
pub fn outcome_summary(results: &[TrialResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let defeated = results.iter().filter(|r| r.virus_defeated()).count();
    100.0 * defeated as f64 / results.len() as f64
}

/// Aggregate view of a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub trials: usize,
    pub defeated: usize,
    pub percent_defeated: f64,
    pub mean_final_infected: f64,
    pub mean_final_immune: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[TrialResult]) -> Self {
        let finals: Vec<&Snapshot> = results.iter().filter_map(TrialResult::final_snapshot).collect();
        let mean = |f: fn(&Snapshot) -> u32| {
            if finals.is_empty() {
                0.0
            } else {
                finals.iter().map(|s| f64::from(f(s))).sum::<f64>() / finals.len() as f64
            }
        };
        Self {
            trials: results.len(),
            defeated: results.iter().filter(|r| r.virus_defeated()).count(),
            percent_defeated: outcome_summary(results),
            mean_final_infected: mean(|s| s.infected),
            mean_final_immune: mean(|s| s.immune),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_final(trial: u32, infected: u32) -> TrialResult {
        TrialResult {
            trial,
            seed: u64::from(trial),
            series: vec![Snapshot { time: 10, infected, immune: 3, positions: None }],
        }
    }

    #[test]
    fn results_are_ordered_and_seeded_per_trial() {
        let runner = BatchRunner::new(6, 20).with_base_seed(100);
        let results = runner.run(&SimParams::default(), None).unwrap();
        assert_eq!(results.len(), 6);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.trial, i as u32);
            assert_eq!(result.seed, 100 + i as u64);
            assert_eq!(result.series.len(), 21);
            assert!(result.series.iter().all(|s| s.positions.is_none()));
        }
    }

    #[test]
    fn batches_are_reproducible() {
        let runner = BatchRunner::new(4, 30).with_base_seed(9);
        let params = SimParams::new(10, 10, 0.2, 0.2, 0.1, 15).unwrap();
        let a = runner.run(&params, None).unwrap();
        let b = runner.run(&params, None).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.series, y.series);
        }
    }

    #[test]
    fn trial_matches_a_standalone_simulation_with_its_seed() {
        let params = SimParams::new(10, 10, 0.2, 0.2, 0.1, 15).unwrap();
        let results = BatchRunner::new(3, 25).with_base_seed(40).run(&params, None).unwrap();
        let mut sim = Simulation::new(params.with_seed(42).with_record_positions(false)).unwrap();
        sim.run(25);
        assert_eq!(results[2].series, sim.stats().series());
    }

    #[test]
    fn guaranteed_extinction_is_always_defeated() {
        let params = SimParams::new(20, 20, 0.01, 0.0, 1.0, 0).unwrap();
        let results = BatchRunner::new(5, 3).run(&params, None).unwrap();
        assert_eq!(outcome_summary(&results), 100.0);
    }

    #[test]
    fn full_infection_is_never_defeated() {
        let params = SimParams::new(5, 5, 1.0, 0.5, 0.0, 10).unwrap();
        let results = BatchRunner::new(3, 5).run(&params, None).unwrap();
        assert_eq!(outcome_summary(&results), 0.0);
    }

    #[test]
    fn summary_is_a_percentage() {
        let results = vec![result_with_final(0, 0), result_with_final(1, 4), result_with_final(2, 0), result_with_final(3, 1)];
        assert_eq!(outcome_summary(&results), 50.0);
        assert_eq!(outcome_summary(&[]), 0.0);

        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.trials, 4);
        assert_eq!(summary.defeated, 2);
        assert_eq!(summary.percent_defeated, 50.0);
        assert_eq!(summary.mean_final_infected, 1.25);
        assert_eq!(summary.mean_final_immune, 3.0);
    }

    #[test]
    fn invalid_parameters_fail_the_batch() {
        let mut params = SimParams::default();
        params.width = 0;
        assert!(BatchRunner::new(2, 2).run(&params, None).is_err());
    }
}
