//! Field loading: eager interpolation and deferred reads.

use crate::error::{Result, VolumeGridError};
use crate::interpolate::{interpolate_sweep, InterpMethod};
use crate::plan::InterpolationPlan;
use crate::range::CommonGrid;
use radar_model::{FieldTable, MomentId, RayBlock, ScanCatalog, DEFAULT_FILL_VALUE};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// External read access to one moment's raw data.
///
/// Implementations return a block shaped `[total selected rays,
/// gate_count]` on the common grid, with every gate a sweep did not
/// sample at that resolution already marked "no data". Reads must be
/// re-enterable: a deferred field may invoke the same read repeatedly.
pub trait MomentSource {
    /// Read one moment's full-volume ray block.
    fn read_moment(
        &self,
        moment: MomentId,
        gate_count: usize,
        sweeps: Option<&[usize]>,
    ) -> anyhow::Result<RayBlock>;
}

/// Options controlling field loading.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Defer reads for moments that need no interpolation.
    pub defer_loading: bool,
    /// Interpolation mode for coarse-resolution sweeps.
    pub method: InterpMethod,
    /// Reserved fill value used during interpolation arithmetic.
    pub fill_value: f32,
    /// Sweep subset forwarded to the source. Set this to the same
    /// indices the catalog was restricted to with
    /// [`ScanCatalog::subset`].
    pub sweeps: Option<Vec<usize>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            defer_loading: false,
            method: InterpMethod::Linear,
            fill_value: DEFAULT_FILL_VALUE,
            sweeps: None,
        }
    }
}

/// A deferred field read.
///
/// The thunk owns its source handle and may be invoked any number of
/// times; every call performs a fresh read, nothing is cached here.
#[derive(Clone)]
pub struct FieldThunk {
    source: Arc<dyn MomentSource>,
    moment: MomentId,
    gate_count: usize,
    sweeps: Option<Vec<usize>>,
}

impl FieldThunk {
    /// Read the field's block now.
    pub fn load(&self) -> Result<RayBlock> {
        Ok(self
            .source
            .read_moment(self.moment, self.gate_count, self.sweeps.as_deref())?)
    }

    /// The moment this thunk reads.
    pub fn moment(&self) -> MomentId {
        self.moment
    }
}

impl fmt::Debug for FieldThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldThunk")
            .field("moment", &self.moment)
            .field("gate_count", &self.gate_count)
            .field("sweeps", &self.sweeps)
            .finish_non_exhaustive()
    }
}

/// A field of the assembled volume: materialized now, or loadable on
/// demand.
#[derive(Debug)]
pub enum FieldResult {
    /// Data materialized during assembly.
    Loaded(RayBlock),
    /// Deferred read, invoked at the point of access.
    Deferred(FieldThunk),
}

impl FieldResult {
    /// The materialized block, when already loaded.
    pub fn block(&self) -> Option<&RayBlock> {
        match self {
            FieldResult::Loaded(block) => Some(block),
            FieldResult::Deferred(_) => None,
        }
    }

    /// Whether this field is still deferred.
    pub fn is_deferred(&self) -> bool {
        matches!(self, FieldResult::Deferred(_))
    }

    /// Resolve to a block, reading now if deferred.
    pub fn resolve(self) -> Result<RayBlock> {
        match self {
            FieldResult::Loaded(block) => Ok(block),
            FieldResult::Deferred(thunk) => thunk.load(),
        }
    }
}

/// Produce one [`FieldResult`] per selected moment.
///
/// Moments with no interpolation-plan entry are read verbatim, deferred
/// when `options.defer_loading` is set. A moment with a plan entry is
/// always read eagerly: its block is converted to the filled
/// representation, every planned sweep is rewritten in place onto the
/// common grid, and the block is re-masked before it is returned.
pub fn load_fields(
    catalog: &ScanCatalog,
    table: &FieldTable,
    grid: &CommonGrid,
    plan: &InterpolationPlan,
    source: &Arc<dyn MomentSource>,
    options: &LoadOptions,
) -> Result<BTreeMap<String, FieldResult>> {
    let gate_count = grid.gate_count as usize;
    let mut fields = BTreeMap::new();

    for moment in catalog.available_moments() {
        let entry = match table.field_for(moment) {
            Some(entry) => entry,
            None => continue,
        };

        if options.defer_loading && !plan.needs_interpolation(moment) {
            let thunk = FieldThunk {
                source: Arc::clone(source),
                moment,
                gate_count,
                sweeps: options.sweeps.clone(),
            };
            fields.insert(entry.name.clone(), FieldResult::Deferred(thunk));
            continue;
        }

        let mut block = source.read_moment(moment, gate_count, options.sweeps.as_deref())?;
        if block.rays() != catalog.total_rays() || block.gates() != gate_count {
            return Err(VolumeGridError::ShapeMismatch {
                moment,
                rays: block.rays(),
                gates: block.gates(),
                expected_rays: catalog.total_rays(),
                expected_gates: gate_count,
            });
        }

        if let Some(sweeps) = plan.sweeps_for(moment) {
            warn!(
                %moment,
                ?sweeps,
                "gate spacing is not constant, interpolating coarse sweeps"
            );
            block.fill(options.fill_value);
            for &sweep in sweeps {
                let rays = catalog
                    .ray_range(sweep)
                    .ok_or(VolumeGridError::InvalidPlan { moment, sweep })?;
                let native = catalog
                    .sweep(sweep)
                    .and_then(|s| s.geometry(moment))
                    .ok_or(VolumeGridError::InvalidPlan { moment, sweep })?;
                interpolate_sweep(
                    &mut block,
                    rays,
                    native.gate_count as usize,
                    options.fill_value,
                    options.method,
                );
            }
            block.mask(options.fill_value);
        }

        fields.insert(entry.name.clone(), FieldResult::Loaded(block));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::build_plan;
    use crate::range::resolve_grid;
    use crate::testdata::{
        mixed_resolution_catalog, scatter_coarse_row, uniform_catalog, FailingSource, StaticSource,
    };

    fn pipeline(
        catalog: &ScanCatalog,
        table: &FieldTable,
    ) -> (CommonGrid, InterpolationPlan) {
        let grid = resolve_grid(catalog, table).unwrap();
        let plan = build_plan(catalog, table, &grid).unwrap();
        (grid, plan)
    }

    #[test]
    fn test_eager_load_returns_blocks() {
        let catalog = uniform_catalog(2, 4, 8, &[MomentId::Reflectivity]);
        let table = FieldTable::standard();
        let (grid, plan) = pipeline(&catalog, &table);

        let inner = Arc::new(
            StaticSource::new().with_block(MomentId::Reflectivity, RayBlock::missing(8, 8)),
        );
        let source: Arc<dyn MomentSource> = inner.clone();
        let fields =
            load_fields(&catalog, &table, &grid, &plan, &source, &LoadOptions::default()).unwrap();

        assert_eq!(fields.len(), 1);
        let field = &fields["reflectivity"];
        assert!(!field.is_deferred());
        assert_eq!(field.block().unwrap().rays(), 8);
        assert_eq!(inner.read_count(), 1);
    }

    #[test]
    fn test_deferred_load_reads_nothing_up_front() {
        let catalog = uniform_catalog(2, 4, 8, &[MomentId::Reflectivity]);
        let table = FieldTable::standard();
        let (grid, plan) = pipeline(&catalog, &table);

        let inner = Arc::new(
            StaticSource::new().with_block(MomentId::Reflectivity, RayBlock::missing(8, 8)),
        );
        let source: Arc<dyn MomentSource> = inner.clone();
        let options = LoadOptions {
            defer_loading: true,
            ..LoadOptions::default()
        };
        let fields = load_fields(&catalog, &table, &grid, &plan, &source, &options).unwrap();

        assert!(fields["reflectivity"].is_deferred());
        assert_eq!(inner.read_count(), 0);
    }

    #[test]
    fn test_thunk_is_reinvocable() {
        let catalog = uniform_catalog(1, 2, 8, &[MomentId::Velocity]);
        let table = FieldTable::standard();
        let (grid, plan) = pipeline(&catalog, &table);

        let mut stored = RayBlock::missing(2, 8);
        stored.set(0, 0, 5.0);
        let inner = Arc::new(StaticSource::new().with_block(MomentId::Velocity, stored.clone()));
        let source: Arc<dyn MomentSource> = inner.clone();
        let options = LoadOptions {
            defer_loading: true,
            ..LoadOptions::default()
        };
        let fields = load_fields(&catalog, &table, &grid, &plan, &source, &options).unwrap();

        let thunk = match &fields["velocity"] {
            FieldResult::Deferred(thunk) => thunk,
            FieldResult::Loaded(_) => panic!("expected a deferred field"),
        };
        let first = thunk.load().unwrap();
        let second = thunk.load().unwrap();
        assert!(first.bits_eq(&stored));
        assert!(second.bits_eq(&stored));
        assert_eq!(inner.read_count(), 2);
    }

    #[test]
    fn test_interpolated_moment_loads_eagerly_despite_deferral() {
        let catalog = mixed_resolution_catalog(1, 1, 2, 16, 3);
        let table = FieldTable::standard();
        let (grid, plan) = pipeline(&catalog, &table);
        assert!(plan.needs_interpolation(MomentId::Reflectivity));

        // fine sweep rays fully sampled, coarse sweep rays scattered
        let mut ref_block = RayBlock::missing(4, 16);
        for ray in 0..2 {
            for gate in 0..16 {
                ref_block.set(ray, gate, gate as f32);
            }
        }
        for ray in 2..4 {
            scatter_coarse_row(&mut ref_block, ray, &[10.0, 14.0, 26.0]);
        }
        let mut vel_block = RayBlock::missing(4, 16);
        vel_block.set(0, 0, 1.0);

        let inner = Arc::new(
            StaticSource::new()
                .with_block(MomentId::Reflectivity, ref_block)
                .with_block(MomentId::Velocity, vel_block),
        );
        let source: Arc<dyn MomentSource> = inner.clone();
        let options = LoadOptions {
            defer_loading: true,
            ..LoadOptions::default()
        };
        let fields = load_fields(&catalog, &table, &grid, &plan, &source, &options).unwrap();

        // velocity needs no correction and stays deferred
        assert!(fields["velocity"].is_deferred());
        // reflectivity was read and corrected now
        let block = fields["reflectivity"].block().unwrap();
        assert_eq!(inner.read_count(), 1);

        // fine rays untouched
        assert_eq!(block.get(0, 5), Some(5.0));
        // coarse rays: synthesized gates between the real samples
        assert_eq!(block.get(2, 0), Some(10.0));
        assert_eq!(block.get(2, 1), Some(11.0));
        assert_eq!(block.get(2, 2), Some(12.0));
        assert_eq!(block.get(2, 3), Some(13.0));
        assert_eq!(block.get(2, 4), Some(14.0));
        assert_eq!(block.get(3, 6), Some(20.0));
        // nothing synthesized past the last real sample at gate 8
        assert!(block.is_missing(2, 9));
        assert!(block.is_missing(3, 15));
    }

    #[test]
    fn test_read_failure_propagates() {
        let catalog = uniform_catalog(1, 2, 8, &[MomentId::Reflectivity]);
        let table = FieldTable::standard();
        let (grid, plan) = pipeline(&catalog, &table);

        let source: Arc<dyn MomentSource> = Arc::new(FailingSource);
        let err = load_fields(&catalog, &table, &grid, &plan, &source, &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, VolumeGridError::Read(_)));
        assert!(err.to_string().contains("archive read failed"));
    }

    #[test]
    fn test_misshapen_block_is_rejected() {
        let catalog = uniform_catalog(2, 4, 8, &[MomentId::Reflectivity]);
        let table = FieldTable::standard();
        let (grid, plan) = pipeline(&catalog, &table);

        // two rays short of the catalog's eight
        let inner = Arc::new(
            StaticSource::new().with_block(MomentId::Reflectivity, RayBlock::missing(6, 8)),
        );
        let source: Arc<dyn MomentSource> = inner.clone();
        let err = load_fields(&catalog, &table, &grid, &plan, &source, &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            VolumeGridError::ShapeMismatch {
                rays: 6,
                expected_rays: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_unmapped_moment_produces_no_field() {
        let catalog = uniform_catalog(1, 2, 8, &[MomentId::Reflectivity, MomentId::Velocity]);
        let table = FieldTable::standard().with_excluded(["velocity"]);
        let (grid, plan) = pipeline(&catalog, &table);

        let inner = Arc::new(
            StaticSource::new().with_block(MomentId::Reflectivity, RayBlock::missing(2, 8)),
        );
        let source: Arc<dyn MomentSource> = inner.clone();
        let fields =
            load_fields(&catalog, &table, &grid, &plan, &source, &LoadOptions::default()).unwrap();
        assert!(fields.contains_key("reflectivity"));
        assert!(!fields.contains_key("velocity"));
    }
}
