//! Stochastic gene diffusion between neighbouring land cells.
//!
//! Each tick has two phases. The compute phase reads only the committed
//! generation and writes only the scratch buffer; the commit phase swaps the
//! two for the whole grid at once. No cell can therefore see a value another
//! cell produced in the same tick.

use crate::grid::{GridModel, HexCell};
use crate::random::{RandomProvider, SeededRandom};
use hexgene_core::{DiffusionConfig, Gene, GeneVector, GENE_COUNT};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Counters describing one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    /// Land cells processed
    pub land_cells: usize,
    /// Gene positions that were picked for resampling
    pub positions_resampled: usize,
    /// Gene positions whose symbol actually changed
    pub genes_changed: usize,
}

impl TickStats {
    pub fn merge(self, other: TickStats) -> TickStats {
        TickStats {
            land_cells: self.land_cells + other.land_cells,
            positions_resampled: self.positions_resampled + other.positions_resampled,
            genes_changed: self.genes_changed + other.genes_changed,
        }
    }
}

/// Advances the gene field one generation at a time
#[derive(Debug, Clone)]
pub struct DiffusionEngine {
    replace_probability: f64,
}

impl Default for DiffusionEngine {
    fn default() -> Self {
        Self::new(&DiffusionConfig::default())
    }
}

impl DiffusionEngine {
    pub fn new(config: &DiffusionConfig) -> Self {
        Self {
            replace_probability: config.replace_probability,
        }
    }

    /// Compute and commit one generation, drawing from `random` cell by cell
    /// in row-major order.
    pub fn tick<R: RandomProvider + ?Sized>(&self, grid: &mut GridModel, random: &mut R) -> TickStats {
        let stats = self.compute(grid, random);
        grid.commit();
        stats
    }

    /// Compute phase only: fill the scratch buffer from the committed genes.
    pub fn compute<R: RandomProvider + ?Sized>(&self, grid: &mut GridModel, random: &mut R) -> TickStats {
        let (cells, current, next) = grid.buffers_mut();
        let mut stats = TickStats::default();

        for (index, slot) in next.iter_mut().enumerate() {
            let (genes, cell_stats) = self.next_genes(index, cells, current, &mut *random);
            *slot = genes;
            stats = stats.merge(cell_stats);
        }

        trace!(?stats, "Computed next generation");
        stats
    }

    /// Like [`tick`](Self::tick) but with the compute phase spread over the
    /// rayon pool.
    ///
    /// One seed is drawn from `random` per tick and every cell samples its own
    /// ChaCha stream of that seed, so workers never share generator state.
    pub fn tick_parallel<R: RandomProvider + ?Sized>(&self, grid: &mut GridModel, random: &mut R) -> TickStats {
        let tick_seed = random.next_seed();
        let (cells, current, next) = grid.buffers_mut();

        let stats = next
            .par_iter_mut()
            .enumerate()
            .map(|(index, slot)| {
                if !cells[index].is_land() {
                    *slot = current[index];
                    return TickStats::default();
                }
                let mut stream = SeededRandom::for_stream(tick_seed, index as u64);
                let (genes, cell_stats) = self.next_genes(index, cells, current, &mut stream);
                *slot = genes;
                cell_stats
            })
            .reduce(TickStats::default, TickStats::merge);

        grid.commit();
        trace!(?stats, tick_seed, "Committed parallel generation");
        stats
    }

    /// Next genes of the cell at `index`. Ocean cells keep theirs untouched.
    fn next_genes<R: RandomProvider + ?Sized>(
        &self,
        index: usize,
        cells: &[HexCell],
        current: &[GeneVector],
        random: &mut R,
    ) -> (GeneVector, TickStats) {
        let cell = &cells[index];
        let mut genes = current[index];
        if !cell.is_land() {
            return (genes, TickStats::default());
        }

        let mut stats = TickStats {
            land_cells: 1,
            ..Default::default()
        };

        for position in 0..GENE_COUNT {
            if random.next_unit() >= self.replace_probability {
                continue;
            }
            stats.positions_resampled += 1;

            let mut candidates = [Gene::from_unit(0.0); 6];
            let mut count = 0;
            for neighbor in cell.neighbors().iter().flatten() {
                if cells[*neighbor].is_land() {
                    candidates[count] = current[*neighbor].get(position);
                    count += 1;
                }
            }

            // No land neighbours: nothing to copy from
            if count == 0 {
                continue;
            }

            let pick = ((random.next_unit() * count as f64) as usize).min(count - 1);
            let chosen = candidates[pick];
            if chosen != genes.get(position) {
                stats.genes_changed += 1;
            }
            genes.set(position, chosen);
        }

        (genes, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};
    use crate::terrain::TerrainClassifier;
    use hexgene_core::{GridConfig, GridCoordinate, OceanMargin, TerrainConfig, ALPHABET};
    use proptest::prelude::*;

    fn flat_terrain() -> TerrainConfig {
        TerrainConfig {
            ocean_margin: OceanMargin { x: 0.0, y: 0.0 },
            ..Default::default()
        }
    }

    fn genes(code: &str) -> GeneVector {
        code.parse().unwrap()
    }

    fn grid_with<F>(columns: i32, rows: i32, land: F, codes: &[&str]) -> GridModel
    where
        F: Fn(GridCoordinate) -> bool,
    {
        // Noise encodes the coordinate so the stub can answer per cell
        let grid_config = GridConfig { columns, rows };
        let noise = move |x: f64, y: f64| {
            let coordinate = GridCoordinate::new((x / 0.30).round() as i32, (y / 0.06).round() as i32);
            if land(coordinate) { 1.0 } else { 0.0 }
        };
        let classifier = TerrainClassifier::new(flat_terrain(), &grid_config, noise);
        let topology = crate::topology::NeighborTopology::new(columns, rows);
        GridModel::build(&grid_config, &classifier, |c| {
            genes(codes[topology.index_of(c).unwrap() % codes.len()])
        })
        .unwrap()
    }

    #[test]
    fn test_isolated_land_is_stable() {
        let mut grid = grid_with(3, 3, |c| c == GridCoordinate::new(1, 1), &["5A5A5A"]);
        let engine = DiffusionEngine::default();
        let mut random = SeededRandom::new(9);

        for _ in 0..50 {
            let stats = engine.tick(&mut grid, &mut random);
            assert_eq!(stats.land_cells, 1);
            assert_eq!(stats.genes_changed, 0);
        }
        assert_eq!(grid.genes(GridCoordinate::new(1, 1)).unwrap(), &genes("5A5A5A"));
    }

    #[test]
    fn test_ocean_is_untouched() {
        let mut grid = grid_with(4, 6, |c| c.column >= 2, &["012345", "6789AB", "CDEF01"]);
        let before: Vec<GeneVector> = (0..grid.len()).map(|i| *grid.genes_at(i).unwrap()).collect();
        let engine = DiffusionEngine::default();
        let mut random = SeededRandom::new(3);

        for _ in 0..20 {
            engine.tick(&mut grid, &mut random);
        }
        for index in 0..grid.len() {
            let cell = grid.cell_at(index).unwrap();
            if !cell.is_land() {
                assert_eq!(grid.genes_at(index), Some(&before[index]));
            }
        }
    }

    #[test]
    fn test_zero_probability_freezes_genes() {
        let mut grid = grid_with(5, 5, |_| true, &["000000", "FFFFFF"]);
        let engine = DiffusionEngine::new(&DiffusionConfig {
            replace_probability: 0.0,
            ..Default::default()
        });
        let mut random = SeededRandom::new(5);
        let stats = engine.tick(&mut grid, &mut random);
        assert_eq!(stats.positions_resampled, 0);
        assert_eq!(stats.land_cells, 25);
    }

    #[test]
    fn test_full_probability_copies_only_neighbor_values() {
        // Two land cells that only touch each other
        let pair = |c: GridCoordinate| c == GridCoordinate::new(0, 0) || c == GridCoordinate::new(0, 1);
        let mut grid = grid_with(2, 2, pair, &["AAAAAA", "000000", "BBBBBB", "000000"]);
        let engine = DiffusionEngine::new(&DiffusionConfig {
            replace_probability: 1.0,
            ..Default::default()
        });
        let mut random = SeededRandom::new(17);

        engine.tick(&mut grid, &mut random);
        // Each cell takes all six genes from its only land neighbour
        assert_eq!(grid.genes(GridCoordinate::new(0, 0)).unwrap(), &genes("BBBBBB"));
        assert_eq!(grid.genes(GridCoordinate::new(0, 1)).unwrap(), &genes("AAAAAA"));
    }

    #[test]
    fn test_compute_leaves_committed_genes_alone() {
        let pair = |c: GridCoordinate| c == GridCoordinate::new(0, 0) || c == GridCoordinate::new(0, 1);
        let mut grid = grid_with(2, 2, pair, &["AAAAAA", "000000", "BBBBBB", "000000"]);
        let engine = DiffusionEngine::new(&DiffusionConfig {
            replace_probability: 1.0,
            ..Default::default()
        });
        let mut random = SeededRandom::new(17);

        engine.compute(&mut grid, &mut random);
        assert_eq!(grid.genes(GridCoordinate::new(0, 0)).unwrap(), &genes("AAAAAA"));
        grid.commit();
        assert_eq!(grid.genes(GridCoordinate::new(0, 0)).unwrap(), &genes("BBBBBB"));
    }

    #[test]
    fn test_exact_draws_against_pre_tick_values() {
        // Land: (1,0), (1,1), (2,2). (1,1) touches both; the others only (1,1).
        let land = |c: GridCoordinate| {
            c == GridCoordinate::new(1, 0) || c == GridCoordinate::new(1, 1) || c == GridCoordinate::new(2, 2)
        };
        let codes = [
            "000000", "000000", "000000", // row 0
            "000000", "123456", "000000", // row 1
            "000000", "000000", "ABCDEF", // row 2
        ];
        let mut grid = grid_with(3, 3, land, &codes);
        let center = grid.cell(GridCoordinate::new(1, 1)).unwrap();
        assert_eq!(center.neighbors().iter().flatten().count(), 4);

        let mut random = SequenceRandom::new(vec![
            // (1,0): one candidate, the centre
            0.2, 0.0, 0.7, 0.4, 0.99, 0.5, 0.9, 0.0, 0.3,
            // (1,1): candidates [(2,2), (1,0)] in slot order
            0.1, 0.6, 0.3, 0.2, 0.8, 0.45, 0.5, 0.6, 0.25, 0.49,
            // (2,2): nothing resampled
            0.9, 0.9, 0.9, 0.9, 0.9, 0.9,
        ]);
        let stats = DiffusionEngine::default().tick(&mut grid, &mut random);

        assert_eq!(random.consumed(), 25);
        assert_eq!(grid.genes(GridCoordinate::new(1, 0)).unwrap(), &genes("103006"));
        // Position 0 reads (1,0) as it was before the tick, not "1"
        assert_eq!(grid.genes(GridCoordinate::new(1, 1)).unwrap(), &genes("0B305F"));
        assert_eq!(grid.genes(GridCoordinate::new(2, 2)).unwrap(), &genes("ABCDEF"));
        assert_eq!(
            stats,
            TickStats {
                land_cells: 3,
                positions_resampled: 7,
                genes_changed: 7,
            }
        );
    }

    #[test]
    fn test_parallel_tick_matches_invariants() {
        let mut grid = grid_with(12, 20, |c| c.column % 5 != 0, &["012345", "6789AB", "CDEF01", "23456A"]);
        let engine = DiffusionEngine::default();
        let mut random = SeededRandom::new(77);
        let land = grid.land_count();

        for _ in 0..10 {
            let stats = engine.tick_parallel(&mut grid, &mut random);
            assert_eq!(stats.land_cells, land);
            assert!(stats.genes_changed <= stats.positions_resampled);
        }
    }

    #[test]
    fn test_parallel_tick_is_reproducible_for_a_seed() {
        let build = || grid_with(8, 8, |_| true, &["012345", "6789AB", "CDEF01"]);
        let engine = DiffusionEngine::default();
        let mut a = build();
        let mut b = build();
        let mut random_a = SeededRandom::new(4);
        let mut random_b = SeededRandom::new(4);

        for _ in 0..5 {
            engine.tick_parallel(&mut a, &mut random_a);
            engine.tick_parallel(&mut b, &mut random_b);
        }
        let genes_a: Vec<_> = a.views().map(|v| v.genes).collect();
        let genes_b: Vec<_> = b.views().map(|v| v.genes).collect();
        assert_eq!(genes_a, genes_b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_genes_stay_in_alphabet(seed in 0u64..10_000, ticks in 1usize..15, parallel in any::<bool>()) {
            let mut grid = grid_with(9, 11, |c| (c.column + c.row) % 4 != 0, &["012345", "6789AB", "CDEF01"]);
            let engine = DiffusionEngine::default();
            let mut random = SeededRandom::new(seed);

            let land_before: Vec<bool> = grid.views().map(|v| v.land).collect();
            for _ in 0..ticks {
                if parallel {
                    engine.tick_parallel(&mut grid, &mut random);
                } else {
                    engine.tick(&mut grid, &mut random);
                }
            }

            for (index, view) in grid.views().enumerate() {
                prop_assert_eq!(view.land, land_before[index]);
                let genes = grid.genes_at(index).unwrap();
                prop_assert_eq!(genes.genes().len(), GENE_COUNT);
                for gene in genes.genes() {
                    prop_assert!(ALPHABET.contains(&gene.to_char()));
                }
            }
        }

        #[test]
        fn prop_new_symbols_come_from_neighbors(seed in 0u64..10_000) {
            let mut grid = grid_with(7, 9, |_| true, &["012345", "6789AB", "CDEF01", "FEDCBA"]);
            let before: Vec<GeneVector> = (0..grid.len()).map(|i| *grid.genes_at(i).unwrap()).collect();
            DiffusionEngine::default().tick(&mut grid, &mut SeededRandom::new(seed));

            for index in 0..grid.len() {
                let cell = grid.cell_at(index).unwrap();
                let after = grid.genes_at(index).unwrap();
                for position in 0..GENE_COUNT {
                    let value = after.get(position);
                    let from_neighbor = cell
                        .neighbors()
                        .iter()
                        .flatten()
                        .any(|n| before[*n].get(position) == value);
                    prop_assert!(value == before[index].get(position) || from_neighbor);
                }
            }
        }
    }
}
