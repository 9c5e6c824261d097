//! The hex grid: cells, their neighbour links and the double-buffered genes.

use crate::noise::NoiseProvider;
use crate::random::RandomProvider;
use crate::terrain::TerrainClassifier;
use crate::topology::{NeighborSlots, NeighborTopology};
use hexgene_core::{
    Direction, Error, Gene, GeneVector, GridConfig, GridCoordinate, MapConfig, Result, GENE_COUNT,
};
use tracing::{debug, info, instrument};

/// A single hex. Terrain and position never change after construction.
#[derive(Debug, Clone)]
pub struct HexCell {
    coordinate: GridCoordinate,
    land: bool,
    neighbors: NeighborSlots,
}

impl HexCell {
    fn new(coordinate: GridCoordinate, land: bool) -> Self {
        Self {
            coordinate,
            land,
            neighbors: [None; 6],
        }
    }

    pub fn coordinate(&self) -> GridCoordinate {
        self.coordinate
    }

    pub fn is_land(&self) -> bool {
        self.land
    }

    /// Storage indices of the neighbours; all `None` for ocean cells.
    pub fn neighbors(&self) -> &NeighborSlots {
        &self.neighbors
    }

    pub fn neighbor(&self, direction: Direction) -> Option<usize> {
        self.neighbors[direction.index()]
    }
}

/// What a renderer sees of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub coordinate: GridCoordinate,
    pub land: bool,
    /// Present for land cells only
    pub genes: Option<GeneVector>,
}

/// Owns every cell of the map.
///
/// Neighbour links are plain indices into `cells`, so they never keep a cell
/// alive and cannot form ownership cycles. Genes are double-buffered:
/// `genes` holds the committed generation and `next_genes` the one being
/// computed.
#[derive(Debug, Clone)]
pub struct GridModel {
    topology: NeighborTopology,
    cells: Vec<HexCell>,
    genes: Vec<GeneVector>,
    next_genes: Vec<GeneVector>,
}

impl GridModel {
    /// Validate `config`, classify terrain and draw random starting genes.
    #[instrument(skip_all, fields(columns = config.grid.columns, rows = config.grid.rows))]
    pub fn generate<N, R>(config: &MapConfig, noise: N, random: &mut R) -> Result<Self>
    where
        N: NoiseProvider,
        R: RandomProvider + ?Sized,
    {
        config.validate()?;
        let classifier = TerrainClassifier::new(config.terrain.clone(), &config.grid, noise);
        let grid = Self::build(&config.grid, &classifier, |_| random_genes(&mut *random))?;

        info!(
            cells = grid.len(),
            land_cells = grid.land_count(),
            "Generated hex map"
        );
        Ok(grid)
    }

    /// Build a grid in two passes: every cell first, then neighbour links.
    pub fn build<N, F>(grid: &GridConfig, classifier: &TerrainClassifier<N>, mut genes_for: F) -> Result<Self>
    where
        N: NoiseProvider,
        F: FnMut(GridCoordinate) -> GeneVector,
    {
        if grid.columns <= 0 || grid.rows <= 0 {
            return Err(Error::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                grid.columns, grid.rows
            )));
        }

        let topology = NeighborTopology::from_config(grid);
        let count = topology.cell_count();
        let mut cells = Vec::with_capacity(count);
        let mut genes = Vec::with_capacity(count);

        for index in 0..count {
            let coordinate = topology.coordinate_of(index);
            cells.push(HexCell::new(coordinate, classifier.is_land(coordinate)));
            genes.push(genes_for(coordinate));
        }

        let mut model = Self {
            topology,
            next_genes: genes.clone(),
            cells,
            genes,
        };
        model.link_neighbors();
        Ok(model)
    }

    /// Second construction pass. Only land cells get neighbours.
    fn link_neighbors(&mut self) {
        let topology = self.topology;
        let mut linked = 0usize;
        for cell in self.cells.iter_mut().filter(|cell| cell.land) {
            cell.neighbors = topology.neighbor_slots(cell.coordinate);
            linked += 1;
        }
        debug!(linked_cells = linked, "Linked neighbours");
    }

    pub fn columns(&self) -> i32 {
        self.topology.columns()
    }

    pub fn rows(&self) -> i32 {
        self.topology.rows()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn land_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.land).count()
    }

    fn checked_index(&self, coordinate: GridCoordinate) -> Result<usize> {
        self.topology
            .index_of(coordinate)
            .ok_or(Error::OutOfBounds {
                column: coordinate.column,
                row: coordinate.row,
            })
    }

    pub fn cell(&self, coordinate: GridCoordinate) -> Result<&HexCell> {
        let index = self.checked_index(coordinate)?;
        Ok(&self.cells[index])
    }

    pub fn cell_at(&self, index: usize) -> Option<&HexCell> {
        self.cells.get(index)
    }

    /// Committed genes of a cell.
    pub fn genes(&self, coordinate: GridCoordinate) -> Result<&GeneVector> {
        let index = self.checked_index(coordinate)?;
        Ok(&self.genes[index])
    }

    pub fn genes_at(&self, index: usize) -> Option<&GeneVector> {
        self.genes.get(index)
    }

    /// Neighbour cell of `coordinate` in `direction`, if linked.
    pub fn neighbor(&self, coordinate: GridCoordinate, direction: Direction) -> Result<Option<&HexCell>> {
        let cell = self.cell(coordinate)?;
        Ok(cell.neighbor(direction).map(|index| &self.cells[index]))
    }

    pub fn view(&self, coordinate: GridCoordinate) -> Result<CellView> {
        let index = self.checked_index(coordinate)?;
        Ok(self.view_at(index))
    }

    fn view_at(&self, index: usize) -> CellView {
        let cell = &self.cells[index];
        CellView {
            coordinate: cell.coordinate,
            land: cell.land,
            genes: cell.land.then_some(self.genes[index]),
        }
    }

    /// Every cell in row-major order.
    pub fn views(&self) -> impl Iterator<Item = CellView> + '_ {
        (0..self.cells.len()).map(move |index| self.view_at(index))
    }

    /// Borrow the cells, the committed genes and the scratch buffer at once.
    pub(crate) fn buffers_mut(&mut self) -> (&[HexCell], &[GeneVector], &mut [GeneVector]) {
        (&self.cells, &self.genes, &mut self.next_genes)
    }

    /// Make the scratch generation current.
    pub(crate) fn commit(&mut self) {
        std::mem::swap(&mut self.genes, &mut self.next_genes);
    }
}

/// Six symbols drawn uniformly from the alphabet.
pub fn random_genes<R: RandomProvider + ?Sized>(random: &mut R) -> GeneVector {
    let mut genes = [Gene::from_unit(0.0); GENE_COUNT];
    for gene in genes.iter_mut() {
        *gene = Gene::from_unit(random.next_unit());
    }
    GeneVector::new(genes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};
    use hexgene_core::{OceanMargin, TerrainConfig};

    fn flat_terrain() -> TerrainConfig {
        TerrainConfig {
            ocean_margin: OceanMargin { x: 0.0, y: 0.0 },
            ..Default::default()
        }
    }

    fn genes(code: &str) -> GeneVector {
        code.parse().unwrap()
    }

    #[test]
    fn test_build_all_land() {
        let grid_config = GridConfig { columns: 4, rows: 6 };
        let classifier = TerrainClassifier::new(flat_terrain(), &grid_config, |_: f64, _: f64| 0.9);
        let grid = GridModel::build(&grid_config, &classifier, |_| genes("000000")).unwrap();

        assert_eq!(grid.len(), 24);
        assert_eq!(grid.land_count(), 24);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.rows(), 6);

        let cell = grid.cell(GridCoordinate::new(1, 2)).unwrap();
        assert!(cell.neighbors().iter().all(Option::is_some));
    }

    #[test]
    fn test_ocean_cells_have_no_neighbors() {
        let grid_config = GridConfig { columns: 5, rows: 5 };
        let classifier = TerrainClassifier::new(flat_terrain(), &grid_config, |_: f64, _: f64| 0.1);
        let grid = GridModel::build(&grid_config, &classifier, |_| genes("ABCDEF")).unwrap();

        assert_eq!(grid.land_count(), 0);
        for index in 0..grid.len() {
            assert_eq!(grid.cell_at(index).unwrap().neighbors(), &[None; 6]);
        }
    }

    #[test]
    fn test_land_links_include_ocean_neighbors() {
        // Row 1 land, rows 0 and 2 ocean; noise y = row * 0.06
        let grid_config = GridConfig { columns: 3, rows: 3 };
        let classifier = TerrainClassifier::new(flat_terrain(), &grid_config, |_: f64, y: f64| {
            if (y - 0.06).abs() < 1e-9 { 1.0 } else { 0.0 }
        });
        let grid = GridModel::build(&grid_config, &classifier, |_| genes("123456")).unwrap();
        let center = GridCoordinate::new(1, 1);

        assert!(grid.cell(center).unwrap().is_land());
        assert!(grid.neighbor(center, Direction::Above).unwrap().is_none());
        assert!(grid.neighbor(center, Direction::Below).unwrap().is_none());

        let upper_right = grid.neighbor(center, Direction::UpperRight).unwrap().unwrap();
        assert_eq!(upper_right.coordinate(), GridCoordinate::new(2, 0));
        assert!(!upper_right.is_land());
    }

    #[test]
    fn test_lookup_out_of_bounds() {
        let grid_config = GridConfig { columns: 2, rows: 2 };
        let classifier = TerrainClassifier::new(flat_terrain(), &grid_config, |_: f64, _: f64| 0.9);
        let grid = GridModel::build(&grid_config, &classifier, |_| genes("000000")).unwrap();

        assert!(matches!(
            grid.cell(GridCoordinate::new(2, 0)),
            Err(Error::OutOfBounds { column: 2, row: 0 })
        ));
        assert!(grid.genes(GridCoordinate::new(0, -1)).is_err());
        assert!(grid.cell_at(4).is_none());
    }

    #[test]
    fn test_views_hide_ocean_genes() {
        let grid_config = GridConfig { columns: 3, rows: 3 };
        let classifier = TerrainClassifier::new(flat_terrain(), &grid_config, |x: f64, _: f64| {
            if x < 0.1 { 0.0 } else { 1.0 }
        });
        let grid = GridModel::build(&grid_config, &classifier, |_| genes("C0FFEE")).unwrap();

        for view in grid.views() {
            if view.coordinate.column == 0 {
                assert!(!view.land);
                assert_eq!(view.genes, None);
            } else {
                assert!(view.land);
                assert_eq!(view.genes, Some(genes("C0FFEE")));
            }
        }
    }

    #[test]
    fn test_generate_rejects_bad_config() {
        let mut config = MapConfig::default();
        config.grid = GridConfig { columns: 0, rows: 4 };
        let mut random = SeededRandom::new(1);
        let result = GridModel::generate(&config, |_: f64, _: f64| 0.5, &mut random);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_generate_draws_six_genes_per_cell() {
        let mut config = MapConfig::default();
        config.grid = GridConfig { columns: 4, rows: 5 };
        let mut random = SequenceRandom::new(vec![0.0, 0.5, 0.99]);
        let grid = GridModel::generate(&config, |_: f64, _: f64| 0.9, &mut random).unwrap();

        assert_eq!(random.consumed(), 4 * 5 * GENE_COUNT);
        assert_eq!(grid.genes_at(0), Some(&genes("08F08F")));
        assert_eq!(grid.genes_at(1), Some(&genes("08F08F")));
    }

    #[test]
    fn test_commit_swaps_generations() {
        let grid_config = GridConfig { columns: 1, rows: 1 };
        let classifier = TerrainClassifier::new(flat_terrain(), &grid_config, |_: f64, _: f64| 0.9);
        let mut grid = GridModel::build(&grid_config, &classifier, |_| genes("111111")).unwrap();

        {
            let (_, current, next) = grid.buffers_mut();
            assert_eq!(current[0], genes("111111"));
            next[0] = genes("222222");
        }
        assert_eq!(grid.genes_at(0), Some(&genes("111111")));

        grid.commit();
        assert_eq!(grid.genes_at(0), Some(&genes("222222")));
    }
}
