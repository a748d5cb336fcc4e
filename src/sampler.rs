use crate::core::Basis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random stream owned by a single simulation run.
///
/// Every sampling operation of a run (basis choices, bit choices and
/// measurement outcomes) draws from the same `RandomSource`, so a run is a
/// pure function of its seed and parameters.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Creates a source seeded from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform random bit.
    pub fn bit(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    /// Uniform random basis.
    pub fn basis(&mut self) -> Basis {
        if self.rng.random_bool(0.5) {
            Basis::X
        } else {
            Basis::Z
        }
    }

    /// `len` independent uniform bits.
    pub fn bits(&mut self, len: usize) -> Vec<bool> {
        (0..len).map(|_| self.bit()).collect()
    }

    /// `len` independent uniform bases.
    pub fn bases(&mut self, len: usize) -> Vec<Basis> {
        (0..len).map(|_| self.basis()).collect()
    }

    /// Randomly selects an outcome index weighted by `probs`.
    ///
    /// `probs` must be normalized. Outcomes with zero probability are never
    /// returned.
    pub fn pick_outcome(&mut self, probs: &[f64]) -> usize {
        let roll: f64 = self.rng.random(); // [0.0, 1.0)

        let mut cumulative = 0.0;
        let mut last_possible = 0;
        for (i, &p) in probs.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            last_possible = i;
            cumulative += p;
            if roll < cumulative {
                return i;
            }
        }
        // Rounding left the cumulative sum just below the roll
        last_possible
    }
}
