//! Volume assembly.

use crate::error::Result;
use crate::loader::{load_fields, FieldResult, LoadOptions, MomentSource};
use crate::plan::build_plan;
use crate::range::{resolve_grid, CommonGrid};
use chrono::{DateTime, Utc};
use radar_model::{FieldTable, ScanCatalog};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// An assembled radar volume on a single common range grid.
///
/// This is the hand-off to the volume container: resolved grid, loaded
/// or deferred fields, and the per-sweep bookkeeping needed to slice the
/// ray-major field blocks back into sweeps.
#[derive(Debug)]
pub struct Volume {
    /// The common range grid all fields share.
    pub grid: CommonGrid,
    /// Output fields keyed by resolved field name.
    pub fields: BTreeMap<String, FieldResult>,
    /// Ray index range of each sweep within the field blocks.
    pub sweep_ray_ranges: Vec<Range<usize>>,
    /// Target elevation angle of each sweep, degrees.
    pub elevation_angles: Vec<f32>,
    /// Volume coverage pattern number, when the archive reported one.
    pub vcp_pattern: Option<u16>,
    /// Collection start time, when the archive reported one.
    pub start_time: Option<DateTime<Utc>>,
}

impl Volume {
    /// Number of sweeps in the volume.
    pub fn nsweeps(&self) -> usize {
        self.sweep_ray_ranges.len()
    }

    /// Look up a field by output name.
    pub fn field(&self, name: &str) -> Option<&FieldResult> {
        self.fields.get(name)
    }

    /// Remove and return a field, e.g. to resolve a deferred read.
    pub fn take_field(&mut self, name: &str) -> Option<FieldResult> {
        self.fields.remove(name)
    }
}

/// Assemble a volume: resolve the common grid, plan interpolation, and
/// load one field per selected moment.
///
/// When `options.sweeps` is set, the catalog is restricted to those
/// sweeps first and the same subset is forwarded to the source.
pub fn read_volume(
    catalog: &ScanCatalog,
    table: &FieldTable,
    source: Arc<dyn MomentSource>,
    options: LoadOptions,
) -> Result<Volume> {
    let restricted;
    let catalog = match &options.sweeps {
        Some(sweeps) => {
            restricted = catalog.subset(sweeps)?;
            &restricted
        }
        None => catalog,
    };

    let grid = resolve_grid(catalog, table)?;
    let plan = build_plan(catalog, table, &grid)?;
    let fields = load_fields(catalog, table, &grid, &plan, &source, &options)?;

    Ok(Volume {
        grid,
        fields,
        sweep_ray_ranges: catalog.sweep_ray_ranges(),
        elevation_angles: catalog.elevation_angles(),
        vcp_pattern: catalog.vcp_pattern(),
        start_time: catalog.start_time(),
    })
}
