//! Error types for the volume grid pipeline.

use radar_model::{ModelError, MomentId};
use thiserror::Error;

/// Errors raised while assembling a volume grid.
#[derive(Error, Debug)]
pub enum VolumeGridError {
    /// No (moment, sweep) pair passed the field selection.
    #[error("no selected moment in any sweep, cannot derive a range grid")]
    EmptySelection,

    /// A resolution deviation does not match the one supported geometry.
    #[error(
        "moment {moment} in sweep {sweep} is sampled at {gate_spacing} m from {first_gate} m, \
         which is not the supported 4:1 coarse geometry for the {common_gate_spacing} m \
         common grid starting at {common_first_gate} m"
    )]
    UnsupportedResolutionRatio {
        moment: MomentId,
        sweep: usize,
        first_gate: f64,
        gate_spacing: f64,
        common_first_gate: f64,
        common_gate_spacing: f64,
    },

    /// A source block does not match the catalog and common grid shape.
    #[error(
        "moment {moment} block is {rays}x{gates}, expected {expected_rays}x{expected_gates}"
    )]
    ShapeMismatch {
        moment: MomentId,
        rays: usize,
        gates: usize,
        expected_rays: usize,
        expected_gates: usize,
    },

    /// The interpolation plan references a pairing the catalog lacks.
    #[error("interpolation plan references sweep {sweep}, which does not record moment {moment}")]
    InvalidPlan { moment: MomentId, sweep: usize },

    /// The external read operation failed.
    #[error("failed to read moment data: {0}")]
    Read(#[from] anyhow::Error),

    /// A model value was malformed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for volume grid operations.
pub type Result<T> = std::result::Result<T, VolumeGridError>;
