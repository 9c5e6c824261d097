//! Configuration types for map generation and diffusion.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Grid dimensions in cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns
    pub columns: i32,
    /// Number of rows (each row advances half a hex height)
    pub rows: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::from_viewport(1280.0, 720.0, LayoutConfig::default().hex_radius)
    }
}

impl GridConfig {
    /// Derive a grid that covers a viewport of the given pixel size.
    pub fn from_viewport(width: f64, height: f64, hex_radius: f64) -> Self {
        let hex_height = 3f64.sqrt() * hex_radius;
        Self {
            columns: (width / (hex_radius * 3.0)).ceil() as i32,
            rows: (height / (hex_height / 2.0)).ceil() as i32 + 1,
        }
    }

    pub fn cell_count(&self) -> usize {
        (self.columns.max(0) as usize) * (self.rows.max(0) as usize)
    }
}

/// Width of the ocean band along each axis, as a fraction of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanMargin {
    pub x: f64,
    pub y: f64,
}

impl Default for OceanMargin {
    fn default() -> Self {
        Self { x: 0.1, y: 0.2 }
    }
}

/// Terrain classification parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Land threshold: a cell is land when its attenuated noise reaches it
    pub ocean_percentage: f64,
    /// Edge falloff widths
    pub ocean_margin: OceanMargin,
    /// Noise frequency applied to the column index
    pub frequency_x: f64,
    /// Noise frequency applied to the row index
    pub frequency_y: f64,
    /// Number of noise octaves
    pub noise_detail: u32,
    /// Amplitude decay per octave
    pub noise_falloff: f64,
    /// Noise seed; a random one is chosen when absent
    pub noise_seed: Option<u32>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            ocean_percentage: 0.44,
            ocean_margin: OceanMargin::default(),
            frequency_x: 0.30,
            frequency_y: 0.06,
            noise_detail: 8,
            noise_falloff: 0.5,
            noise_seed: None,
        }
    }
}

/// Diffusion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    /// Chance that a gene position is resampled from the neighbours each tick
    pub replace_probability: f64,
    /// Emit a metrics event every this many ticks (0 disables)
    pub metrics_interval: u64,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            replace_probability: 0.5,
            metrics_interval: 100,
        }
    }
}

/// Pixel layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance from hex centre to vertex, in pixels
    pub hex_radius: f64,
    /// Gap between neighbouring hexes, in pixels
    pub hex_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            hex_radius: 10.0,
            hex_margin: 0.0,
        }
    }
}

/// Complete map configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub grid: GridConfig,
    pub terrain: TerrainConfig,
    pub diffusion: DiffusionConfig,
    pub layout: LayoutConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            terrain: TerrainConfig::default(),
            diffusion: DiffusionConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl MapConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: MapConfig = serde_json::from_str(&raw)?;
        debug!(path = %path.as_ref().display(), "Loaded map configuration");
        Ok(config)
    }

    /// Reject configurations the grid cannot be built from.
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if grid.columns <= 0 || grid.rows <= 0 {
            return Err(Error::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                grid.columns, grid.rows
            )));
        }

        let terrain = &self.terrain;
        if !(0.0..=1.0).contains(&terrain.ocean_percentage) {
            return Err(Error::Config(format!(
                "ocean_percentage must be within [0, 1], got {}",
                terrain.ocean_percentage
            )));
        }
        for (axis, margin) in [("x", terrain.ocean_margin.x), ("y", terrain.ocean_margin.y)] {
            if !(0.0..=0.5).contains(&margin) {
                return Err(Error::Config(format!(
                    "ocean_margin.{} must be within [0, 0.5], got {}",
                    axis, margin
                )));
            }
        }
        for (axis, frequency) in [("x", terrain.frequency_x), ("y", terrain.frequency_y)] {
            if !frequency.is_finite() || frequency <= 0.0 {
                return Err(Error::Config(format!(
                    "frequency_{} must be positive, got {}",
                    axis, frequency
                )));
            }
        }
        if terrain.noise_detail == 0 {
            return Err(Error::Config("noise_detail must be at least 1".to_string()));
        }
        if !(terrain.noise_falloff > 0.0 && terrain.noise_falloff <= 1.0) {
            return Err(Error::Config(format!(
                "noise_falloff must be within (0, 1], got {}",
                terrain.noise_falloff
            )));
        }

        if !(0.0..=1.0).contains(&self.diffusion.replace_probability) {
            return Err(Error::Config(format!(
                "replace_probability must be within [0, 1], got {}",
                self.diffusion.replace_probability
            )));
        }

        let layout = &self.layout;
        if !layout.hex_radius.is_finite() || layout.hex_radius <= 0.0 {
            return Err(Error::Config(format!(
                "hex_radius must be positive, got {}",
                layout.hex_radius
            )));
        }
        if !(0.0..2.0 * layout.hex_radius).contains(&layout.hex_margin) {
            return Err(Error::Config(format!(
                "hex_margin must be within [0, {}), got {}",
                2.0 * layout.hex_radius,
                layout.hex_margin
            )));
        }

        Ok(())
    }
}
