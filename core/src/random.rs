use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniformly distributed integers shared by the world and the executors.
pub trait RandomSource {
    /// Returns an integer drawn uniformly from `[0, n)`; `n` of zero or one yields zero.
    fn random(&mut self, n: u32) -> u32;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn random(&mut self, n: u32) -> u32 {
        (**self).random(n)
    }
}

/// [`RandomSource`] backed by a ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct ChaChaSource {
    rng: ChaCha8Rng,
}

impl ChaChaSource {
    /// Creates a reproducible source from a seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a source seeded from the thread-local generator.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }
}

impl RandomSource for ChaChaSource {
    fn random(&mut self, n: u32) -> u32 {
        if n <= 1 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }
}
