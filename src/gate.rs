//! Decision gate
//!
//! One uniform draw per cycle decides whether the thought is surfaced.
//! Seedable so tests and reproducible runs can pin the stream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct DecisionGate {
    rng: StdRng,
}

impl DecisionGate {
    /// Gate seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic gate.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from config when present, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(value) => Self::seeded(value),
            None => Self::new(),
        }
    }

    /// One draw from [0, 1) compared against `probability`.
    pub fn decide(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() < probability
    }
}

impl Default for DecisionGate {
    fn default() -> Self {
        Self::new()
    }
}
