use crate::agent::{Agent, Delta};
use crate::grid::{Grid, Position};
use crate::rng::RngSource;
use crate::stats::StatsCollector;
use epidemic_common::{SimError, SimParams};
use log::{debug, info, trace};
use rayon::prelude::*;

/// Read-only view of the model handed to snapshots and external observers.
#[derive(Debug, Clone, Copy)]
pub struct ModelView<'a> {
    pub time: u64,
    pub infected_count: u32,
    pub immune_count: u32,
    pub running: bool,
    pub grid: &'a Grid<Agent>,
}

/// Manages the state and execution of the epidemic on a fully occupied torus.
pub struct Simulation {
    /// Run parameters, immutable once constructed.
    params: SimParams,
    /// Owns every agent; one per cell.
    grid: Grid<Agent>,
    /// The single random stream all stochastic decisions draw from.
    rng: RngSource,
    /// Number of completed steps.
    time: u64,
    /// Maintained incrementally from per-agent deltas.
    infected_count: u32,
    immune_count: u32,
    /// False whenever nobody is infected. Stepping remains allowed.
    running: bool,
    /// Stores one snapshot per completed step, plus the initial one.
    stats: StatsCollector,
}

impl Simulation {
    /// Creates a simulation seeded from `params.seed`.
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        let rng = RngSource::seeded(params.seed);
        Self::with_rng(params, rng)
    }

    /// Creates a simulation that draws from an existing stream.
    ///
    /// Every cell gets one agent; each agent is initially infected iff its
    /// draw falls below `density`. Draws are taken in row-major cell order.
    pub fn with_rng(params: SimParams, mut rng: RngSource) -> Result<Self, SimError> {
        params.validate()?;

        let mut grid = Grid::new(params.width, params.height)?;
        let cells: Vec<Position> = grid.all_cells().map(|(pos, _)| pos).collect();
        let mut infected_count = 0u32;
        for pos in cells {
            let infected = rng.uniform() < params.density;
            if infected {
                infected_count += 1;
            }
            grid.place(Agent::new(pos, infected), pos)?;
        }
        debug_assert!(grid.is_full());

        debug!(
            "Initialized {}x{} grid: {} agents, {} initially infected. Parameters: {:?}",
            params.width,
            params.height,
            grid.len(),
            infected_count,
            params
        );

        let mut sim = Self {
            stats: StatsCollector::new(params.record_positions),
            params,
            grid,
            rng,
            time: 0,
            infected_count,
            immune_count: 0,
            running: infected_count > 0,
        };
        sim.record_snapshot();
        Ok(sim)
    }

    /// Advances the simulation by one step and records a snapshot.
    ///
    /// All infected-neighbor counts are taken from the grid as it was before
    /// the step, so no agent observes another agent's update of this step.
    /// Transitions then run in row-major order against the single random
    /// stream and their deltas are summed into the counters.
    pub fn step(&mut self) {
        self.time += 1;

        // --- 1. Exposure from the frozen pre-step state (Parallel) ---
        let exposure = self.count_exposure();

        // --- 2. Transitions (Serial, fixed draw order) ---
        let time = self.time;
        let params = &self.params;
        let rng = &mut self.rng;
        let delta: Delta = self
            .grid
            .occupants_mut()
            .zip(exposure)
            .map(|(agent, infected_neighbors)| agent.transition(infected_neighbors, time, params, rng))
            .sum();

        // --- 3. Reduce deltas into the counters ---
        self.infected_count = apply_delta(self.infected_count, delta.infected);
        self.immune_count = apply_delta(self.immune_count, delta.immune);
        debug_assert_eq!(self.recount(), (self.infected_count, self.immune_count));

        if self.running && self.infected_count == 0 {
            info!("Infection died out at step {}.", self.time);
            self.running = false;
        }

        trace!(
            "Step {} completed: infected={} ({:+}), immune={} ({:+})",
            self.time,
            self.infected_count,
            delta.infected,
            self.immune_count,
            delta.immune
        );

        self.record_snapshot();
    }

    /// Calls [`Simulation::step`] `steps` times.
    pub fn run(&mut self, steps: u32) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Number of distinct infected Moore neighbors of every cell, in
    /// row-major order, read from the current state.
    pub fn count_exposure(&self) -> Vec<u8> {
        let grid = &self.grid;
        let width = grid.width();
        (0..grid.len())
            .into_par_iter()
            .map(|idx| {
                grid.neighbor_positions(grid.position_of(idx))
                    .filter(|n| grid.at_index(n.index(width)).is_some_and(Agent::is_infected))
                    .count() as u8
            })
            .collect()
    }

    fn record_snapshot(&mut self) {
        let view = ModelView {
            time: self.time,
            infected_count: self.infected_count,
            immune_count: self.immune_count,
            running: self.running,
            grid: &self.grid,
        };
        self.stats.snapshot(&view);
    }

    /// Counts infected and immune agents from scratch.
    pub fn recount(&self) -> (u32, u32) {
        self.grid.occupants().fold((0, 0), |(infected, immune), agent| {
            (infected + agent.is_infected() as u32, immune + agent.is_immune() as u32)
        })
    }

    pub fn view(&self) -> ModelView<'_> {
        ModelView {
            time: self.time,
            infected_count: self.infected_count,
            immune_count: self.immune_count,
            running: self.running,
            grid: &self.grid,
        }
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn infected_count(&self) -> u32 {
        self.infected_count
    }

    pub fn immune_count(&self) -> u32 {
        self.immune_count
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// Total number of agents; constant for the lifetime of the run.
    pub fn population(&self) -> usize {
        self.grid.occupants().count()
    }

    pub fn agent(&self, pos: Position) -> Result<Option<&Agent>, SimError> {
        self.grid.get(pos)
    }

    pub fn grid(&self) -> &Grid<Agent> {
        &self.grid
    }

    /// Provides access to the run parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    pub fn into_stats(self) -> StatsCollector {
        self.stats
    }

    /// Draws consumed from the random stream so far.
    pub fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }
}

#[inline]
fn apply_delta(count: u32, delta: i64) -> u32 {
    let next = i64::from(count) + delta;
    debug_assert!(next >= 0, "counter went negative: {count} {delta:+}");
    next as u32
}
