//! Random upcoming pieces: each draw is uniform over the seven kinds.

use crate::shape::PieceKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: StdRng,
}

impl Randomizer {
    /// Deterministic sequence for a given seed; entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    pub fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.random_range(0..PieceKind::ALL.len())]
    }
}
