//! Common-grid assembly for multi-resolution radar volume archives.
//!
//! A volume archive records several rotational sweeps, each carrying one
//! or more moments sampled along rays at regular range intervals. Some
//! sweeps are sampled on a coarser range grid than others; this crate
//! reconciles them onto a single common grid without corrupting data:
//!
//! ```text
//! ScanCatalog (from the archive parser)
//!      │
//!      ▼
//! resolve_grid ──► CommonGrid (min first gate, min spacing, max extent)
//!      │
//!      ▼
//! build_plan ──► InterpolationPlan (sweeps sampled off the common grid)
//!      │
//!      ▼
//! load_fields ──► one FieldResult per selected moment
//!      │             eager: read, interpolate coarse sweeps in place
//!      │             deferred: re-invocable read thunk
//!      ▼
//! Volume (common grid + fields + sweep bookkeeping)
//! ```
//!
//! Exactly one coarse geometry is supported: gate spacing four times the
//! common spacing with the first coarse gate one and a half common
//! spacings past the common first gate. Any other deviation is refused
//! with [`VolumeGridError::UnsupportedResolutionRatio`] rather than
//! resampled by guesswork.

pub mod error;
pub mod interpolate;
pub mod loader;
pub mod plan;
pub mod range;
pub mod testdata;
pub mod volume;

pub use error::{Result, VolumeGridError};
pub use interpolate::{interpolate_sweep, InterpMethod};
pub use loader::{load_fields, FieldResult, FieldThunk, LoadOptions, MomentSource};
pub use plan::{build_plan, InterpolationPlan};
pub use range::{resolve_grid, CommonGrid};
pub use volume::{read_volume, Volume};
