//! Error types for the radar data model.

use thiserror::Error;

/// Errors raised while building model values.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The parser handed over per-moment tables of unequal length.
    #[error("sweep records {moments} moments but the {table} table has {entries} entries")]
    MismatchedMomentTables {
        moments: usize,
        table: &'static str,
        entries: usize,
    },

    /// A sweep index does not exist in the catalog.
    #[error("sweep index {index} out of range for a catalog of {len} sweeps")]
    SweepOutOfRange { index: usize, len: usize },

    /// A flat buffer does not match the requested block shape.
    #[error("buffer of {len} values cannot hold {rays} rays of {gates} gates")]
    ShapeMismatch {
        len: usize,
        rays: usize,
        gates: usize,
    },

    /// A field table config failed to parse.
    #[error("invalid field table: {0}")]
    InvalidFieldTable(String),

    /// A field table file could not be read.
    #[error("failed to read field table: {0}")]
    TableRead(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for ModelError {
    fn from(err: serde_yaml::Error) -> Self {
        ModelError::InvalidFieldTable(err.to_string())
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
