use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::error::{BeliefError, Result};

/// Seed used whenever a layer is created without an explicit generator.
pub const DEFAULT_SEED: u64 = 1234;

/// Deterministic random source owned by a layer.
///
/// Serializes its complete generator state together with the seed it was
/// created from, so a restored generator continues the original stream.
/// Equality compares the full state, stream position included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl LayerRng {
    pub fn seeded(seed: u64) -> Self {
        LayerRng {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next draw from the uniform distribution on `[0, 1)`.
    pub fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl Default for LayerRng {
    fn default() -> Self {
        LayerRng::seeded(DEFAULT_SEED)
    }
}

impl From<u64> for LayerRng {
    fn from(seed: u64) -> Self {
        LayerRng::seeded(seed)
    }
}

impl RngCore for LayerRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Weight initialization strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum WeightInit {
    /// Uniform on `[-1/fan_in, 1/fan_in]` where fan_in is the visible unit count.
    ///
    /// Keeps initial pre-activations small so sigmoid units start away from
    /// saturation.
    #[default]
    FanIn,

    /// Uniform distribution with custom inclusive range
    Uniform { low: f64, high: f64 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize a `[n_visible x n_hidden]` weight matrix from `rng`.
    pub fn initialize_weights<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        let (fan_in, _) = shape;

        match self {
            WeightInit::FanIn => {
                if fan_in == 0 {
                    return Err(BeliefError::invalid_parameter(
                        "n_visible",
                        "fan-in initialization needs at least one visible unit",
                    ));
                }
                let a = 1.0 / fan_in as f64;
                Ok(Array2::random_using(shape, Uniform::new_inclusive(-a, a), rng))
            }

            WeightInit::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(BeliefError::InvalidParameter {
                        name: "weight_init".to_string(),
                        reason: format!("invalid uniform range [{}, {}]", low, high),
                    });
                }
                Ok(Array2::random_using(shape, Uniform::new_inclusive(*low, *high), rng))
            }

            WeightInit::Zeros => Ok(Array2::zeros(shape)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_in_bounds() {
        let mut rng = LayerRng::default();
        let weights = WeightInit::FanIn.initialize_weights((8, 3), &mut rng).unwrap();
        assert_eq!(weights.dim(), (8, 3));
        let a = 1.0 / 8.0;
        assert!(weights.iter().all(|&w| (-a..=a).contains(&w)));
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = LayerRng::seeded(7);
        let mut b = LayerRng::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.next_uniform().to_bits(), b.next_uniform().to_bits());
        }
    }

    #[test]
    fn test_invalid_uniform_range() {
        let mut rng = LayerRng::default();
        let init = WeightInit::Uniform { low: 1.0, high: -1.0 };
        assert!(init.initialize_weights((2, 2), &mut rng).is_err());
    }

    #[test]
    fn test_serialized_rng_resumes_stream() {
        let mut rng = LayerRng::seeded(99);
        for _ in 0..5 {
            rng.next_uniform();
        }

        let bytes = bincode::serialize(&rng).unwrap();
        let mut back: LayerRng = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, rng);
        assert_eq!(back.seed(), 99);
        for _ in 0..8 {
            assert_eq!(back.next_uniform().to_bits(), rng.next_uniform().to_bits());
        }
    }

    #[test]
    fn test_equality_sees_stream_position() {
        let fresh = LayerRng::seeded(3);
        let mut advanced = LayerRng::seeded(3);
        advanced.next_uniform();
        assert_ne!(fresh, advanced);
        assert_eq!(fresh, LayerRng::seeded(3));
    }
}
