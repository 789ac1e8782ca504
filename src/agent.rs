use crate::grid::Position;
use crate::rng::RngSource;
use epidemic_common::SimParams;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Health state of one agent. Being infected and immune at once is unrepresentable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Susceptible,
    /// Infected at step `since`.
    Infected { since: u64 },
    /// Recovered from an infection that started at step `since`.
    Immune { since: u64 },
}

/// Change this agent's transition made to the model-level counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    pub infected: i64,
    pub immune: i64,
}

impl Add for Delta {
    type Output = Delta;
    fn add(self, rhs: Delta) -> Delta {
        Delta { infected: self.infected + rhs.infected, immune: self.immune + rhs.immune }
    }
}

impl AddAssign for Delta {
    fn add_assign(&mut self, rhs: Delta) {
        *self = *self + rhs;
    }
}

impl Sum for Delta {
    fn sum<I: Iterator<Item = Delta>>(iter: I) -> Delta {
        iter.fold(Delta::default(), Add::add)
    }
}

/// One simulated individual. Never moves after placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    position: Position,
    health: Health,
}

impl Agent {
    /// Initially infected agents count as infected at step 0.
    pub fn new(position: Position, infected: bool) -> Self {
        let health = if infected { Health::Infected { since: 0 } } else { Health::Susceptible };
        Self { position, health }
    }

    pub fn position(&self) -> Position { self.position }

    pub fn health(&self) -> Health { self.health }

    pub fn is_infected(&self) -> bool { matches!(self.health, Health::Infected { .. }) }

    pub fn is_immune(&self) -> bool { matches!(self.health, Health::Immune { .. }) }

    pub fn is_susceptible(&self) -> bool { self.health == Health::Susceptible }

    /// Step of the most recent infection while infected or immune.
    pub fn infection_time(&self) -> Option<u64> {
        match self.health {
            Health::Infected { since } | Health::Immune { since } => Some(since),
            Health::Susceptible => None,
        }
    }

    /// Applies one step of the transition rule and returns the counter changes.
    ///
    /// `infected_neighbors` must be counted on the state before this step.
    /// The checks run in a fixed order and each sees the outcome of the
    /// previous one:
    /// 1. immunity older than `immunization_time` steps expires;
    /// 2. an infected agent heals with probability `healing_rate` and becomes immune;
    /// 3. a susceptible agent is infected if `infected_neighbors * infection_rate`
    ///    exceeds a fresh draw.
    ///
    /// Draws are taken only by branches whose guard holds, in this order.
    /// An agent whose immunity expires in step 1 is eligible for step 3 at once.
    pub fn transition(
        &mut self,
        infected_neighbors: u8,
        time: u64,
        params: &SimParams,
        rng: &mut RngSource,
    ) -> Delta {
        let mut delta = Delta::default();

        if let Health::Immune { since } = self.health {
            if time.abs_diff(since) > params.immunization_time {
                self.health = Health::Susceptible;
                delta.immune -= 1;
            }
        }

        if let Health::Infected { since } = self.health {
            if rng.uniform() < params.healing_rate {
                self.health = Health::Immune { since };
                delta.infected -= 1;
                delta.immune += 1;
            }
        }

        if self.health == Health::Susceptible
            && f64::from(infected_neighbors) * params.infection_rate > rng.uniform()
        {
            self.health = Health::Infected { since: time };
            delta.infected += 1;
        }

        delta
    }
}
