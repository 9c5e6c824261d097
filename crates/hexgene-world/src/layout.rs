//! Pixel geometry and fill colours for drawing the map.

use crate::grid::CellView;
use hexgene_core::{GeneVector, GridConfig, GridCoordinate, LayoutConfig};
use std::f64::consts::PI;
use std::fmt;

/// Colour used for land cells that carry no genes
pub const FALLBACK_LAND_RGB: (u8, u8, u8) = (25, 155, 67);

/// Background colour behind the map
pub const OCEAN_RGB: (u8, u8, u8) = (45, 67, 185);

/// How a cell should be filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Genes(GeneVector),
    FallbackLand,
}

impl Fill {
    /// Fill for a cell, or `None` when nothing should be drawn.
    pub fn for_cell(view: &CellView) -> Option<Fill> {
        if !view.land {
            return None;
        }
        Some(match view.genes {
            Some(genes) => Fill::Genes(genes),
            None => Fill::FallbackLand,
        })
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Fill::Genes(genes) => genes.to_rgb(),
            Fill::FallbackLand => FALLBACK_LAND_RGB,
        }
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fill::Genes(genes) => write!(f, "#{}", genes),
            Fill::FallbackLand => {
                let (r, g, b) = FALLBACK_LAND_RGB;
                write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
            }
        }
    }
}

/// Pointy-sided hex geometry for a given radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    radius: f64,
    margin: f64,
}

impl HexLayout {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            radius: config.hex_radius,
            margin: config.hex_margin,
        }
    }

    pub fn hex_width(&self) -> f64 {
        self.radius * 2.0
    }

    pub fn hex_height(&self) -> f64 {
        3f64.sqrt() * self.radius
    }

    /// Pixel centre of a cell.
    pub fn center(&self, coordinate: GridCoordinate) -> (f64, f64) {
        let x = coordinate.column as f64;
        let y = coordinate.row as f64;
        let shift = coordinate.parity() as f64 * 0.75;
        (
            self.hex_width() * (1.5 * x + 0.5 + shift),
            self.hex_height() * (y * 0.5 + 0.5),
        )
    }

    /// Polygon corners, starting at angle 0 and turning by 60 degrees.
    pub fn vertices(&self, coordinate: GridCoordinate) -> [(f64, f64); 6] {
        let (cx, cy) = self.center(coordinate);
        let reach = self.radius - self.margin / 2.0;
        let mut corners = [(0.0, 0.0); 6];
        for (i, corner) in corners.iter_mut().enumerate() {
            let angle = i as f64 * PI / 3.0;
            *corner = (cx + reach * angle.cos(), cy + reach * angle.sin());
        }
        corners
    }

    /// Canvas size that fits the whole grid.
    pub fn canvas_size(&self, grid: &GridConfig) -> (f64, f64) {
        (
            (grid.columns as f64 + 0.25) * (self.radius * 3.0),
            (grid.rows as f64 + 1.0) * (self.hex_height() / 2.0),
        )
    }
}
