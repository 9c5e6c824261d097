//! Uniform random sources driving gene initialisation and diffusion.

use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform sampler over [0, 1).
pub trait RandomProvider {
    fn next_unit(&mut self) -> f64;

    /// A 64-bit seed assembled from two draws.
    fn next_seed(&mut self) -> u64 {
        let high = (self.next_unit() * 4_294_967_296.0) as u64;
        let low = (self.next_unit() * 4_294_967_296.0) as u64;
        (high << 32) | low
    }
}

impl<R: RandomProvider + ?Sized> RandomProvider for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// The ambient thread-local generator
pub struct ThreadRandom {
    rng: ThreadRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomProvider for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// ChaCha-backed generator, reproducible for a given seed and stream
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream `stream` of the generator seeded with `seed`.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self { rng }
    }
}

impl RandomProvider for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// Meant for tests that need to know exactly which branch every draw takes.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "SequenceRandom needs at least one value");
        Self { values, cursor: 0 }
    }

    /// Draws taken so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomProvider for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
