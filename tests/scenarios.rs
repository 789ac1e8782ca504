use epidemic_engine::{outcome_summary, BatchRunner, Position, SimParams, Simulation};
use proptest::prelude::*;
use std::collections::HashSet;

fn params_strategy() -> impl Strategy<Value = SimParams> {
    (1u32..12, 1u32..12, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0u64..30, any::<u64>()).prop_map(
        |(height, width, density, infection_rate, healing_rate, immunization_time, seed)| {
            SimParams::new(height, width, density, infection_rate, healing_rate, immunization_time)
                .unwrap()
                .with_seed(seed)
                .with_record_positions(false)
        },
    )
}

/// Infected agents among the distinct wrapped Moore cells of every cell, row-major.
fn distinct_infected_neighbors(sim: &Simulation) -> Vec<u8> {
    let grid = sim.grid();
    let (w, h) = (i64::from(grid.width()), i64::from(grid.height()));
    grid.all_cells()
        .map(|(pos, _)| {
            let cells: HashSet<(i64, i64)> = (-1..=1)
                .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                .map(|(dx, dy)| ((i64::from(pos.x) + dx).rem_euclid(w), (i64::from(pos.y) + dy).rem_euclid(h)))
                .filter(|&(x, y)| (x, y) != (i64::from(pos.x), i64::from(pos.y)))
                .collect();
            cells
                .into_iter()
                .filter(|&(x, y)| {
                    sim.agent(Position::new(x as u32, y as u32))
                        .unwrap()
                        .is_some_and(|a| a.is_infected())
                })
                .count() as u8
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn exposure_counts_each_distinct_infected_neighbor_once(params in params_strategy(), steps in 0u32..10) {
        let mut sim = Simulation::new(params).unwrap();
        sim.run(steps);
        prop_assert_eq!(sim.count_exposure(), distinct_infected_neighbors(&sim));
    }

    #[test]
    fn counters_never_drift_and_states_stay_exclusive(params in params_strategy(), steps in 1u32..60) {
        let mut sim = Simulation::new(params.clone()).unwrap();
        let population = params.population();
        for _ in 0..steps {
            sim.step();
            prop_assert_eq!(sim.recount(), (sim.infected_count(), sim.immune_count()));
            prop_assert_eq!(sim.population(), population);
            prop_assert!(sim.grid().occupants().all(|a| !(a.is_infected() && a.is_immune())));
        }
        prop_assert_eq!(sim.time(), u64::from(steps));
    }

    #[test]
    fn same_seed_same_trajectory(params in params_strategy(), steps in 1u32..40) {
        let mut a = Simulation::new(params.clone()).unwrap();
        let mut b = Simulation::new(params).unwrap();
        a.run(steps);
        b.run(steps);
        prop_assert_eq!(a.stats().series(), b.stats().series());
    }

    #[test]
    fn batch_outcome_is_a_percentage(params in params_strategy(), trials in 0u32..6, steps in 0u32..20) {
        let results = BatchRunner::new(trials, steps).run(&params, None).unwrap();
        let pct = outcome_summary(&results);
        prop_assert!((0.0..=100.0).contains(&pct));
    }
}

#[test]
fn corner_agent_neighbors_opposite_corner() {
    let sim = Simulation::new(SimParams::default()).unwrap();
    let neighbors: Vec<Position> = sim
        .grid()
        .neighbors(Position::new(0, 0))
        .unwrap()
        .map(|a| a.position())
        .collect();
    assert_eq!(neighbors.len(), 8);
    assert!(neighbors.contains(&Position::new(19, 19)));
}

#[test]
fn full_infection_no_healing() {
    for infection_rate in [0.0, 0.35, 1.0] {
        let params = SimParams::new(20, 20, 1.0, infection_rate, 0.0, 100).unwrap();
        let mut sim = Simulation::new(params).unwrap();
        sim.run(100);
        assert!(sim.stats().infected_series().iter().all(|&n| n == 400));
    }
}

#[test]
fn guaranteed_extinction() {
    for seed in 0..20 {
        let params = SimParams::new(20, 20, 0.01, 0.0, 1.0, 0).unwrap().with_seed(seed);
        let mut sim = Simulation::new(params).unwrap();
        sim.run(2);
        assert_eq!(sim.infected_count(), 0, "seed {seed}");
    }
}

#[test]
fn default_model_batch_runs() {
    let results = BatchRunner::new(8, 200).run(&SimParams::default(), None).unwrap();
    assert_eq!(results.len(), 8);
    let pct = outcome_summary(&results);
    assert!((0.0..=100.0).contains(&pct));
}
