//! Interpolation planning.

use crate::error::{Result, VolumeGridError};
use crate::range::CommonGrid;
use radar_model::{FieldTable, MomentId, ScanCatalog};
use std::collections::BTreeMap;

/// Which sweeps deviate from the common range grid, per moment.
///
/// A moment with no deviating sweep has no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpolationPlan {
    entries: BTreeMap<MomentId, Vec<usize>>,
}

impl InterpolationPlan {
    /// Whether no sweep anywhere needs resampling.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moments with at least one deviating sweep, sorted.
    pub fn moments(&self) -> impl Iterator<Item = MomentId> + '_ {
        self.entries.keys().copied()
    }

    /// Deviating sweep indices for a moment, in scan order.
    pub fn sweeps_for(&self, moment: MomentId) -> Option<&[usize]> {
        self.entries.get(&moment).map(Vec::as_slice)
    }

    /// Whether a moment has any deviating sweep.
    pub fn needs_interpolation(&self, moment: MomentId) -> bool {
        self.entries.contains_key(&moment)
    }

    /// Iterate `(moment, sweep indices)` entries, sorted by moment.
    pub fn iter(&self) -> impl Iterator<Item = (MomentId, &[usize])> {
        self.entries.iter().map(|(&m, s)| (m, s.as_slice()))
    }
}

/// Classify which (moment, sweep) pairs were sampled off the common
/// grid and therefore need resampling.
///
/// Every deviation must match the one supported coarse geometry: gate
/// spacing exactly four times the common spacing, with the first coarse
/// gate one and a half common spacings past the common first gate.
/// Anything else is refused rather than resampled by guesswork.
pub fn build_plan(
    catalog: &ScanCatalog,
    table: &FieldTable,
    grid: &CommonGrid,
) -> Result<InterpolationPlan> {
    let mut entries = BTreeMap::new();

    for moment in catalog.available_moments() {
        if !table.is_selected(moment) {
            continue;
        }
        let mut sweeps = Vec::new();
        for (index, sweep) in catalog.sweeps().iter().enumerate() {
            let geometry = match sweep.geometry(moment) {
                Some(g) => g,
                None => continue,
            };
            if geometry.first_gate == grid.first_gate
                && geometry.gate_spacing == grid.gate_spacing
            {
                continue;
            }
            let supported = geometry.gate_spacing == grid.gate_spacing * 4.0
                && geometry.first_gate == grid.first_gate + 1.5 * grid.gate_spacing;
            if !supported {
                return Err(VolumeGridError::UnsupportedResolutionRatio {
                    moment,
                    sweep: index,
                    first_gate: geometry.first_gate,
                    gate_spacing: geometry.gate_spacing,
                    common_first_gate: grid.first_gate,
                    common_gate_spacing: grid.gate_spacing,
                });
            }
            sweeps.push(index);
        }
        if !sweeps.is_empty() {
            entries.insert(moment, sweeps);
        }
    }

    Ok(InterpolationPlan { entries })
}
