//! Error types for map setup and grid access.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Coordinate ({column}, {row}) is outside the grid")]
    OutOfBounds { column: i32, row: i32 },

    #[error("Invalid gene symbol: {0:?}")]
    InvalidGene(char),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
