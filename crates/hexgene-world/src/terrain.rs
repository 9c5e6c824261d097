//! Land/ocean classification from noise with an ocean ring along the edges.

use crate::noise::NoiseProvider;
use hexgene_core::{GridConfig, GridCoordinate, TerrainConfig};

/// Classifies grid coordinates as land or ocean
pub struct TerrainClassifier<N> {
    config: TerrainConfig,
    columns: i32,
    rows: i32,
    noise: N,
}

impl<N: NoiseProvider> TerrainClassifier<N> {
    pub fn new(config: TerrainConfig, grid: &GridConfig, noise: N) -> Self {
        Self {
            config,
            columns: grid.columns,
            rows: grid.rows,
            noise,
        }
    }

    /// Attenuated noise score of a coordinate.
    pub fn land_score(&self, coordinate: GridCoordinate) -> f64 {
        let x = coordinate.column as f64;
        let y = coordinate.row as f64;
        let base = self
            .noise
            .sample(x * self.config.frequency_x, y * self.config.frequency_y);

        let modifier_x = margin_modifier(x / self.columns as f64, self.config.ocean_margin.x);
        let modifier_y = margin_modifier(y / self.rows as f64, self.config.ocean_margin.y);

        base * modifier_x * modifier_y
    }

    pub fn is_land(&self, coordinate: GridCoordinate) -> bool {
        self.land_score(coordinate) >= self.config.ocean_percentage
    }
}

/// Linear falloff to zero across a band of width `margin` at both ends of
/// the unit interval; 1.0 elsewhere.
pub fn margin_modifier(relative: f64, margin: f64) -> f64 {
    if relative > 1.0 - margin {
        (1.0 - relative) / margin
    } else if relative < margin {
        relative / margin
    } else {
        1.0
    }
}
