use crate::simulation::ModelView;
use epidemic_common::Snapshot;
use log::debug;

/// Append-only time series of model snapshots, one per completed step.
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    record_positions: bool,
    snapshots: Vec<Snapshot>,
}

impl StatsCollector {
    pub fn new(record_positions: bool) -> Self {
        Self { record_positions, snapshots: Vec::new() }
    }

    /// Captures the aggregate counts (and optionally every agent's position)
    /// of `model` and appends them as a new record.
    pub fn snapshot(&mut self, model: &ModelView<'_>) {
        let positions = self.record_positions.then(|| {
            model
                .grid
                .occupants()
                .map(|agent| {
                    let pos = agent.position();
                    (pos.x, pos.y)
                })
                .collect()
        });

        debug!(
            "Recording snapshot at step {}: infected={}, immune={}",
            model.time, model.infected_count, model.immune_count
        );

        self.snapshots.push(Snapshot {
            time: model.time,
            infected: model.infected_count,
            immune: model.immune_count,
            positions,
        });
    }

    /// The full ordered series of records.
    pub fn series(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Infected count trajectory over time.
    pub fn infected_series(&self) -> Vec<u32> {
        self.snapshots.iter().map(|s| s.infected).collect()
    }

    /// Immune count trajectory over time.
    pub fn immune_series(&self) -> Vec<u32> {
        self.snapshots.iter().map(|s| s.immune).collect()
    }

    /// Hands the recorded series over, consuming the collector.
    pub fn into_series(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::Simulation;
    use epidemic_common::SimParams;

    #[test]
    fn initial_snapshot_is_taken_before_any_step() {
        let sim = Simulation::new(SimParams::default().with_seed(1)).unwrap();
        let stats = sim.stats();
        assert_eq!(stats.len(), 1);
        let first = stats.latest().unwrap();
        assert_eq!(first.time, 0);
        assert_eq!(first.infected, sim.infected_count());
        assert_eq!(first.immune, 0);
    }

    #[test]
    fn positions_are_recorded_for_every_agent_in_row_major_order() {
        let params = SimParams::new(3, 4, 0.5, 0.1, 0.1, 5).unwrap().with_record_positions(true);
        let sim = Simulation::new(params).unwrap();
        let positions = sim.stats().series()[0].positions.clone().unwrap();
        assert_eq!(positions.len(), 12);
        assert_eq!(positions[0], (0, 0));
        assert_eq!(positions[1], (1, 0));
        assert_eq!(positions[4], (0, 1));
        assert_eq!(positions[11], (3, 2));
    }

    #[test]
    fn positions_can_be_left_out() {
        let params = SimParams::default().with_record_positions(false);
        let mut sim = Simulation::new(params).unwrap();
        sim.step();
        assert!(sim.stats().series().iter().all(|s| s.positions.is_none()));
    }

    #[test]
    fn series_grows_by_one_per_step_and_keeps_earlier_records() {
        let mut sim = Simulation::new(SimParams::default().with_seed(5)).unwrap();
        let first = sim.stats().series()[0].clone();
        sim.run(10);
        let stats = sim.stats();
        assert_eq!(stats.len(), 11);
        assert_eq!(stats.series()[0], first);
        let times: Vec<u64> = stats.series().iter().map(|s| s.time).collect();
        assert_eq!(times, (0..=10).collect::<Vec<u64>>());
        assert_eq!(stats.infected_series().len(), 11);
        assert_eq!(stats.immune_series().len(), 11);
    }
}
