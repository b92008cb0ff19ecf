//! Common range grid resolution.

use crate::error::{Result, VolumeGridError};
use radar_model::{FieldTable, ScanCatalog};
use serde::{Deserialize, Serialize};

/// The single range-sampling geometry chosen for a whole assembled
/// volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommonGrid {
    /// Distance to the center of the first gate, meters.
    pub first_gate: f64,
    /// Distance between gate centers, meters.
    pub gate_spacing: f64,
    /// Number of gates on the common grid.
    pub gate_count: u32,
}

impl CommonGrid {
    /// Derive the gate count from a grid extent.
    ///
    /// Gate centers are laid out every `gate_spacing` meters starting at
    /// `first_gate`; every center strictly below `last_gate` belongs to
    /// the grid. A catalog whose sweeps all share one geometry therefore
    /// reproduces its own gate count exactly.
    pub fn from_extent(first_gate: f64, gate_spacing: f64, last_gate: f64) -> Self {
        let gate_count = ((last_gate - first_gate) / gate_spacing).ceil() as u32;
        Self {
            first_gate,
            gate_spacing,
            gate_count,
        }
    }

    /// Far edge of the grid, meters.
    pub fn last_gate(&self) -> f64 {
        self.first_gate + self.gate_spacing * (self.gate_count as f64 - 0.5)
    }

    /// Range to the center of each gate, meters.
    pub fn range_centers(&self) -> Vec<f64> {
        (0..self.gate_count)
            .map(|k| self.first_gate + k as f64 * self.gate_spacing)
            .collect()
    }
}

/// Compute the common range grid across every selected (moment, sweep)
/// pair of the catalog.
///
/// The grid starts at the minimum observed first gate, uses the minimum
/// observed gate spacing, and extends to the maximum observed last gate.
/// Moments the field table does not select never enter the fold.
pub fn resolve_grid(catalog: &ScanCatalog, table: &FieldTable) -> Result<CommonGrid> {
    let mut min_first = f64::INFINITY;
    let mut min_spacing = f64::INFINITY;
    let mut max_last = 0.0f64;

    for sweep in catalog.sweeps() {
        for (moment, geometry) in sweep.iter_geometries() {
            if !table.is_selected(moment) {
                continue;
            }
            min_first = min_first.min(geometry.first_gate);
            min_spacing = min_spacing.min(geometry.gate_spacing);
            max_last = max_last.max(geometry.last_gate());
        }
    }

    if !min_first.is_finite() || !min_spacing.is_finite() {
        return Err(VolumeGridError::EmptySelection);
    }
    Ok(CommonGrid::from_extent(min_first, min_spacing, max_last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{
        coarse_geometry, fine_geometry, mixed_resolution_catalog, uniform_catalog, FINE_FIRST,
        FINE_SPACING,
    };
    use radar_model::{MomentId, SweepDescriptor};

    #[test]
    fn test_uniform_catalog_reproduces_geometry() {
        let catalog = uniform_catalog(3, 360, 16, &[MomentId::Reflectivity, MomentId::Velocity]);
        let grid = resolve_grid(&catalog, &FieldTable::standard()).unwrap();
        assert_eq!(grid.first_gate, FINE_FIRST);
        assert_eq!(grid.gate_spacing, FINE_SPACING);
        assert_eq!(grid.gate_count, 16);
    }

    #[test]
    fn test_min_fold_over_mixed_resolutions() {
        let catalog = mixed_resolution_catalog(1, 2, 360, 16, 3);
        let grid = resolve_grid(&catalog, &FieldTable::standard()).unwrap();

        assert_eq!(grid.first_gate, FINE_FIRST);
        assert_eq!(grid.gate_spacing, FINE_SPACING);
        for sweep in catalog.sweeps() {
            for (_, geometry) in sweep.iter_geometries() {
                assert!(grid.first_gate <= geometry.first_gate);
                assert!(grid.gate_spacing <= geometry.gate_spacing);
                assert!(grid.last_gate() >= geometry.last_gate() - 1e-9);
            }
        }
        // coarse extent reaches past the fine sweeps, so the grid does too
        let coarse_last = coarse_geometry(3).last_gate();
        let fine_last = fine_geometry(16).last_gate();
        assert!(coarse_last < fine_last);
        assert!((grid.last_gate() - fine_last).abs() < FINE_SPACING);
    }

    #[test]
    fn test_unselected_moments_are_ignored() {
        // velocity is sampled on an unrelated geometry, but excluded, so
        // the grid follows reflectivity alone
        let sweep = SweepDescriptor::new(
            360,
            0.5,
            vec![MomentId::Reflectivity, MomentId::Velocity],
            vec![16, 20],
            vec![FINE_FIRST, 500.0],
            vec![FINE_SPACING, 300.0],
        )
        .unwrap();
        let catalog = ScanCatalog::new(vec![sweep]);
        let table = FieldTable::standard().with_excluded(["velocity"]);
        let grid = resolve_grid(&catalog, &table).unwrap();
        assert_eq!(grid.first_gate, FINE_FIRST);
        assert_eq!(grid.gate_spacing, FINE_SPACING);
        assert_eq!(grid.gate_count, 16);
    }

    #[test]
    fn test_empty_catalog_fails() {
        let catalog = ScanCatalog::new(vec![]);
        assert!(matches!(
            resolve_grid(&catalog, &FieldTable::standard()),
            Err(VolumeGridError::EmptySelection)
        ));
    }

    #[test]
    fn test_nothing_selected_fails() {
        let catalog = uniform_catalog(2, 360, 16, &[MomentId::Reflectivity]);
        let table = FieldTable::from_yaml_str("fields: {}").unwrap();
        assert!(matches!(
            resolve_grid(&catalog, &table),
            Err(VolumeGridError::EmptySelection)
        ));
    }

    #[test]
    fn test_range_centers() {
        let grid = CommonGrid {
            first_gate: 1000.0,
            gate_spacing: 250.0,
            gate_count: 4,
        };
        assert_eq!(grid.range_centers(), vec![1000.0, 1250.0, 1500.0, 1750.0]);
        assert!((grid.last_gate() - 1875.0).abs() < 1e-9);
    }
}
