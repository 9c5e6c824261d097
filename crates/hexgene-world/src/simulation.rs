//! Simulation driver: owns the map and advances it one frame at a time.

use crate::diffusion::{DiffusionEngine, TickStats};
use crate::grid::{CellView, GridModel};
use crate::noise::{NoiseProvider, PerlinNoise};
use crate::random::{RandomProvider, ThreadRandom};
use hexgene_core::{DiffusionConfig, MapConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, event, info, instrument, Level};

pub struct Simulation<R> {
    grid: GridModel,
    engine: DiffusionEngine,
    random: R,
    config: DiffusionConfig,
    tick: u64,
    parallel: bool,
    totals: TickStats,
}

impl Simulation<ThreadRandom> {
    /// Generate a map from `config` with ambient randomness and Perlin terrain.
    pub fn from_config(config: MapConfig) -> Result<Self> {
        let mut random = ThreadRandom::new();
        let noise = PerlinNoise::from_config(&config.terrain, random.next_seed() as u32);
        Self::new(config, noise, random)
    }
}

impl<R: RandomProvider> Simulation<R> {
    pub fn new<N: NoiseProvider>(config: MapConfig, noise: N, mut random: R) -> Result<Self> {
        let grid = GridModel::generate(&config, noise, &mut random)?;
        Ok(Self::from_grid(grid, config.diffusion, random))
    }

    /// Wrap an already built grid.
    pub fn from_grid(grid: GridModel, config: DiffusionConfig, random: R) -> Self {
        Self {
            engine: DiffusionEngine::new(&config),
            grid,
            random,
            config,
            tick: 0,
            parallel: false,
            totals: TickStats::default(),
        }
    }

    /// Run the compute phase on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Advance one tick.
    pub fn step(&mut self) -> TickStats {
        let stats = if self.parallel {
            self.engine.tick_parallel(&mut self.grid, &mut self.random)
        } else {
            self.engine.tick(&mut self.grid, &mut self.random)
        };

        self.tick += 1;
        self.totals = self.totals.merge(stats);

        let interval = self.config.metrics_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.emit_diffusion_metrics(&stats);
        }

        stats
    }

    /// Run a fixed number of ticks.
    #[instrument(skip(self), fields(start_tick = self.tick))]
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        info!("Running diffusion for {} ticks", ticks);
        for _ in 0..ticks {
            self.step();
        }

        let summary = self.summary();
        info!(
            event = "run_summary",
            ticks = summary.ticks,
            land_cells = summary.land_cells,
            genes_changed = summary.genes_changed,
            distinct_colors = summary.distinct_colors,
            "Diffusion run complete"
        );
        summary
    }

    fn emit_diffusion_metrics(&self, stats: &TickStats) {
        let distinct = self.distinct_colors();
        let change_rate = if stats.positions_resampled > 0 {
            stats.genes_changed as f64 / stats.positions_resampled as f64 * 100.0
        } else {
            0.0
        };

        debug!(
            event = "diffusion_metrics",
            tick = self.tick,
            land_cells = stats.land_cells,
            positions_resampled = stats.positions_resampled,
            genes_changed = stats.genes_changed,
            change_rate = format!("{:.2}%", change_rate),
            distinct_colors = distinct,
            "Diffusion metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "distinct_colors",
            gauge_value = distinct,
            tick = self.tick,
            "Distinct land colours"
        );
    }

    /// Number of different gene vectors currently on land.
    pub fn distinct_colors(&self) -> usize {
        self.grid
            .views()
            .filter_map(|view| view.genes)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn summary(&self) -> RunSummary {
        let land_cells = self.grid.land_count();
        RunSummary {
            ticks: self.tick,
            cells: self.grid.len(),
            land_cells,
            ocean_cells: self.grid.len() - land_cells,
            positions_resampled: self.totals.positions_resampled,
            genes_changed: self.totals.genes_changed,
            distinct_colors: self.distinct_colors(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    /// Current state of every cell, for drawing.
    pub fn cells(&self) -> impl Iterator<Item = CellView> + '_ {
        self.grid.views()
    }
}

/// Totals over the life of a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub cells: usize,
    pub land_cells: usize,
    pub ocean_cells: usize,
    pub positions_resampled: usize,
    pub genes_changed: usize,
    pub distinct_colors: usize,
}
