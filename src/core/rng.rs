//! Random variates for the simulation.
//!
//! A `RandomSource` is owned by whoever samples from it. Simulations that
//! should not be correlated receive their own source, either seeded directly
//! or forked from a parent source.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, Uniform};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::{Result, SirError};

#[derive(Clone, Debug)]
pub struct RandomSource<R: RngCore = StdRng> {
    rng: R,
    seed: u64,
}

impl RandomSource {
    /// Create a reproducible source from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a source seeded from the high-resolution system clock.
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos() as u64)
            .unwrap_or_default();
        Self::from_seed(seed)
    }

    /// Derive an independent source whose seed is drawn from this one.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.next_u64())
    }
}

impl<R: RngCore> RandomSource<R> {
    /// Wrap an existing generator, recording the seed it was created from.
    pub fn from_rng(rng: R, seed: u64) -> Self {
        Self { rng, seed }
    }

    /// The seed this source was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw from an arbitrary distribution.
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        distribution.sample(&mut self.rng)
    }

    /// Draw a real uniformly from `[lo, hi]`.
    pub fn uniform_real(&mut self, lo: f64, hi: f64) -> Result<f64> {
        let distribution = Uniform::new_inclusive(lo, hi).map_err(|err| {
            SirError::InvalidParameter(format!("invalid real range [{lo}, {hi}]: {err}"))
        })?;
        Ok(distribution.sample(&mut self.rng))
    }

    /// Draw an integer uniformly from `[lo, hi]`.
    pub fn uniform_integer(&mut self, lo: usize, hi: usize) -> Result<usize> {
        let distribution = Uniform::new_inclusive(lo, hi).map_err(|err| {
            SirError::InvalidParameter(format!("invalid integer range [{lo}, {hi}]: {err}"))
        })?;
        Ok(distribution.sample(&mut self.rng))
    }

    /// Sample an exponential waiting time `-ln(U) / rate`.
    ///
    /// A uniform draw of exactly zero would yield an infinite waiting time and is drawn
    /// again. A rate of zero means the event never happens and yields infinity.
    pub fn waiting_time(&mut self, rate: f64) -> f64 {
        if rate <= 0. {
            return f64::INFINITY;
        }
        loop {
            let uniform: f64 = self.rng.random();
            if uniform > 0. {
                return -uniform.ln() / rate;
            }
            log::trace!("Degenerate uniform sample of zero, drawing again.");
        }
    }
}
