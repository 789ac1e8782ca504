use rand::prelude::*;

/// The single seedable random stream of one simulation instance.
///
/// Every stochastic decision of the model goes through [`RngSource::uniform`],
/// so the order in which draws are taken fully determines a run for a given seed.
#[derive(Debug, Clone)]
pub struct RngSource {
    rng: StdRng,
    draws: u64,
}

impl RngSource {
    /// Creates a stream from a 64-bit seed. Equal seeds give equal streams.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Wraps an existing generator, e.g. one continued from a previous run.
    pub fn from_rng(rng: StdRng) -> Self {
        Self { rng, draws: 0 }
    }

    /// One fresh uniform draw in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
