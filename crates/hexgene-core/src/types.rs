//! Core type definitions for the hex map.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The 16 symbols a gene may take, in index order.
pub const ALPHABET: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
];

/// Number of genes carried by every cell.
pub const GENE_COUNT: usize = 6;

/// Position of a cell in the offset hex grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub column: i32,
    pub row: i32,
}

impl GridCoordinate {
    pub fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    pub fn offset(&self, d_column: i32, d_row: i32) -> Self {
        Self {
            column: self.column + d_column,
            row: self.row + d_row,
        }
    }

    /// Row parity: 1 for odd rows, 0 for even rows.
    pub fn parity(&self) -> i32 {
        self.row.rem_euclid(2)
    }

    pub fn is_within(&self, columns: i32, rows: i32) -> bool {
        (0..columns).contains(&self.column) && (0..rows).contains(&self.row)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// One of the six hex directions, in neighbour-slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Above,
    UpperRight,
    LowerRight,
    Below,
    LowerLeft,
    UpperLeft,
}

impl Direction {
    pub fn all() -> [Direction; 6] {
        [
            Direction::Above,
            Direction::UpperRight,
            Direction::LowerRight,
            Direction::Below,
            Direction::LowerLeft,
            Direction::UpperLeft,
        ]
    }

    /// Neighbour slot index, 0 to 5.
    pub fn index(&self) -> usize {
        match self {
            Direction::Above => 0,
            Direction::UpperRight => 1,
            Direction::LowerRight => 2,
            Direction::Below => 3,
            Direction::LowerLeft => 4,
            Direction::UpperLeft => 5,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Above => Direction::Below,
            Direction::UpperRight => Direction::LowerLeft,
            Direction::LowerRight => Direction::UpperLeft,
            Direction::Below => Direction::Above,
            Direction::LowerLeft => Direction::UpperRight,
            Direction::UpperLeft => Direction::LowerRight,
        }
    }

    /// Column and row offset for a cell on a row of the given parity.
    ///
    /// Rows advance half a hex height, so the vertical neighbours sit two
    /// rows away and odd rows are shifted half a hex to the right.
    pub fn to_delta(&self, parity: i32) -> (i32, i32) {
        match self {
            Direction::Above => (0, -2),
            Direction::UpperRight => (parity, -1),
            Direction::LowerRight => (parity, 1),
            Direction::Below => (0, 2),
            Direction::LowerLeft => (parity - 1, 1),
            Direction::UpperLeft => (parity - 1, -1),
        }
    }
}

/// A single hexadecimal gene symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gene(u8);

impl Gene {
    /// Pick the symbol addressed by a uniform draw in [0, 1).
    pub fn from_unit(draw: f64) -> Self {
        let index = (draw * ALPHABET.len() as f64).floor() as usize;
        Self(index.min(ALPHABET.len() - 1) as u8)
    }

    pub fn from_char(symbol: char) -> Result<Self> {
        ALPHABET
            .iter()
            .position(|&c| c == symbol.to_ascii_uppercase())
            .map(|index| Self(index as u8))
            .ok_or(Error::InvalidGene(symbol))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn to_char(&self) -> char {
        ALPHABET[usize::from(self.0)]
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Six genes read together as an RGB colour code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneVector([Gene; GENE_COUNT]);

impl GeneVector {
    pub fn new(genes: [Gene; GENE_COUNT]) -> Self {
        Self(genes)
    }

    pub fn get(&self, position: usize) -> Gene {
        self.0[position]
    }

    pub fn set(&mut self, position: usize, gene: Gene) {
        self.0[position] = gene;
    }

    pub fn genes(&self) -> &[Gene; GENE_COUNT] {
        &self.0
    }

    /// Decode the six symbols as an (r, g, b) triple.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let channel = |hi: Gene, lo: Gene| hi.value() * 16 + lo.value();
        (
            channel(self.0[0], self.0[1]),
            channel(self.0[2], self.0[3]),
            channel(self.0[4], self.0[5]),
        )
    }
}

impl fmt::Display for GeneVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gene in &self.0 {
            write!(f, "{}", gene)?;
        }
        Ok(())
    }
}

impl FromStr for GeneVector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let symbols: Vec<char> = s.chars().collect();
        if symbols.len() != GENE_COUNT {
            return Err(Error::Serialization(format!(
                "gene vector needs {} symbols, got {:?}",
                GENE_COUNT, s
            )));
        }

        let mut genes = [Gene(0); GENE_COUNT];
        for (slot, symbol) in genes.iter_mut().zip(symbols) {
            *slot = Gene::from_char(symbol)?;
        }
        Ok(Self(genes))
    }
}

impl TryFrom<String> for GeneVector {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<GeneVector> for String {
    fn from(genes: GeneVector) -> Self {
        genes.to_string()
    }
}
