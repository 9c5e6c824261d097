//! Map generation and gene diffusion.
//!
//! Terrain is classified once from a noise field; land cells then carry a
//! six-symbol gene vector that spreads between neighbouring land cells one
//! tick at a time.

pub mod diffusion;
pub mod grid;
pub mod layout;
pub mod noise;
pub mod random;
pub mod simulation;
pub mod terrain;
pub mod topology;

pub use diffusion::{DiffusionEngine, TickStats};
pub use grid::{CellView, GridModel, HexCell};
pub use layout::{Fill, HexLayout};
pub use self::noise::{NoiseProvider, PerlinNoise};
pub use random::{RandomProvider, SeededRandom, SequenceRandom, ThreadRandom};
pub use simulation::{RunSummary, Simulation};
pub use terrain::TerrainClassifier;
pub use topology::NeighborTopology;
