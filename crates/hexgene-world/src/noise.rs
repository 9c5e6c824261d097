//! Coherent noise sources for terrain classification.

use hexgene_core::TerrainConfig;
use ::noise::{NoiseFn, Perlin};

/// Largest value a provider may return; samples live in [0, 1).
const MAX_SAMPLE: f64 = 1.0 - f64::EPSILON;

/// Deterministic 2D noise with values in [0, 1).
pub trait NoiseProvider {
    fn sample(&self, x: f64, y: f64) -> f64;
}

impl<F> NoiseProvider for F
where
    F: Fn(f64, f64) -> f64,
{
    fn sample(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Multi-octave Perlin noise remapped into [0, 1)
pub struct PerlinNoise {
    perlin: Perlin,
    octaves: u32,
    falloff: f64,
}

impl PerlinNoise {
    pub fn new(seed: u32, octaves: u32, falloff: f64) -> Self {
        Self {
            perlin: Perlin::new(seed),
            octaves: octaves.max(1),
            falloff,
        }
    }

    /// Build from terrain settings, using `seed` when the config has none.
    pub fn from_config(config: &TerrainConfig, seed: u32) -> Self {
        Self::new(
            config.noise_seed.unwrap_or(seed),
            config.noise_detail,
            config.noise_falloff,
        )
    }

    /// Fractal sum normalised to roughly [-1, 1].
    fn fbm(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.octaves {
            total += amplitude * self.perlin.get([x * frequency, y * frequency]);
            max_value += amplitude;
            amplitude *= self.falloff;
            frequency *= 2.0;
        }

        total / max_value
    }
}

impl NoiseProvider for PerlinNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        ((self.fbm(x, y) + 1.0) / 2.0).clamp(0.0, MAX_SAMPLE)
    }
}
