//! Core types and configuration for hexgene, a noise-generated hex map whose
//! land cells blend colour genes with their neighbours every tick.

pub mod types;
pub mod config;
pub mod error;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
