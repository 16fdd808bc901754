use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::Side;

/// Independent weighted coin: side A with `probability_a`, otherwise B.
#[derive(Debug, Clone)]
pub struct RandomOracle {
    probability_a: f64,
    rng: ChaCha8Rng,
}

impl RandomOracle {
    /// `probability_a` is clamped into [0, 1]. Without a seed the RNG is seeded from entropy.
    pub fn new(probability_a: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            probability_a: probability_a.clamp(0.0, 1.0),
            rng,
        }
    }

    pub fn probability_a(&self) -> f64 {
        self.probability_a
    }

    /// Draw a fresh side. Called once per round.
    pub fn sample(&mut self) -> Side {
        if self.rng.gen_bool(self.probability_a) {
            Side::A
        } else {
            Side::B
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomOracle::new(0.5066, Some(42));
        let mut b = RandomOracle::new(0.5066, Some(42));
        let xs: Vec<Side> = (0..50).map(|_| a.sample()).collect();
        let ys: Vec<Side> = (0..50).map(|_| b.sample()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_degenerate_probabilities() {
        let mut always_a = RandomOracle::new(1.0, Some(1));
        let mut always_b = RandomOracle::new(0.0, Some(1));
        for _ in 0..20 {
            assert_eq!(always_a.sample(), Side::A);
            assert_eq!(always_b.sample(), Side::B);
        }
    }

    #[test]
    fn test_frequency_tracks_probability() {
        let mut oracle = RandomOracle::new(0.508, Some(7));
        let n = 20_000;
        let a_count = (0..n).filter(|_| oracle.sample() == Side::A).count();
        let freq = a_count as f64 / n as f64;
        assert!((freq - 0.508).abs() < 0.02, "freq {}", freq);
    }

    #[test]
    fn test_probability_is_clamped() {
        assert_eq!(RandomOracle::new(1.7, Some(0)).probability_a(), 1.0);
        assert_eq!(RandomOracle::new(-0.2, Some(0)).probability_a(), 0.0);
    }
}
