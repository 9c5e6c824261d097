//! Neighbour addressing for the offset hex grid.
//!
//! Rows advance half a hex height and odd rows sit half a hex to the right,
//! so a cell at (x, y) touches (x, y ± 2) vertically and four diagonal cells
//! one row away whose column depends on the parity of y.

use hexgene_core::{Direction, GridConfig, GridCoordinate};

/// Neighbour slots in [`Direction`] order; `None` marks an absent neighbour.
pub type NeighborSlots = [Option<usize>; 6];

/// Bounds-aware neighbour lookup for a fixed grid size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborTopology {
    columns: i32,
    rows: i32,
}

impl NeighborTopology {
    pub fn new(columns: i32, rows: i32) -> Self {
        Self { columns, rows }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.columns, config.rows)
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_count(&self) -> usize {
        (self.columns.max(0) as usize) * (self.rows.max(0) as usize)
    }

    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        coordinate.is_within(self.columns, self.rows)
    }

    /// Row-major storage index of an in-bounds coordinate.
    pub fn index_of(&self, coordinate: GridCoordinate) -> Option<usize> {
        self.contains(coordinate)
            .then(|| (coordinate.row * self.columns + coordinate.column) as usize)
    }

    pub fn coordinate_of(&self, index: usize) -> GridCoordinate {
        let index = index as i32;
        GridCoordinate::new(index % self.columns, index / self.columns)
    }

    /// The adjacent coordinate in `direction`, if it lies inside the grid.
    ///
    /// The column range check also rejects the diagonal moves that would
    /// step past the last column on odd rows or before column 0 on even
    /// rows, so nothing wraps around.
    pub fn neighbor(&self, coordinate: GridCoordinate, direction: Direction) -> Option<GridCoordinate> {
        let (d_column, d_row) = direction.to_delta(coordinate.parity());
        let candidate = coordinate.offset(d_column, d_row);
        self.contains(candidate).then_some(candidate)
    }

    pub fn neighbors(&self, coordinate: GridCoordinate) -> [Option<GridCoordinate>; 6] {
        Direction::all().map(|direction| self.neighbor(coordinate, direction))
    }

    /// Storage indices of every in-bounds neighbour, by direction slot.
    pub fn neighbor_slots(&self, coordinate: GridCoordinate) -> NeighborSlots {
        self.neighbors(coordinate)
            .map(|neighbor| neighbor.and_then(|c| self.index_of(c)))
    }
}
