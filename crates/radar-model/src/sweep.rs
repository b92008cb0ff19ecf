//! Sweep descriptors and the scan catalog.

use crate::error::{ModelError, Result};
use crate::moment::MomentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

/// Range-sampling geometry of one moment within one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentGeometry {
    /// Number of range gates sampled.
    pub gate_count: u32,
    /// Distance to the center of the first gate, meters.
    pub first_gate: f64,
    /// Distance between gate centers, meters.
    pub gate_spacing: f64,
}

impl MomentGeometry {
    /// Far edge of the last gate, meters.
    pub fn last_gate(&self) -> f64 {
        self.first_gate + self.gate_spacing * (self.gate_count as f64 - 0.5)
    }
}

/// Immutable description of one rotational scan as reported by the
/// archive parser.
///
/// The per-moment tables are parallel: entry `i` of each table describes
/// the moment at position `i` of the archive's moment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDescriptor {
    ray_count: u32,
    elevation_angle: f32,
    moments: Vec<MomentId>,
    gate_counts: Vec<u32>,
    first_gates: Vec<f64>,
    gate_spacings: Vec<f64>,
}

impl SweepDescriptor {
    /// Build a descriptor from the parser's parallel per-moment tables.
    pub fn new(
        ray_count: u32,
        elevation_angle: f32,
        moments: Vec<MomentId>,
        gate_counts: Vec<u32>,
        first_gates: Vec<f64>,
        gate_spacings: Vec<f64>,
    ) -> Result<Self> {
        let n = moments.len();
        for (table, entries) in [
            ("gate_counts", gate_counts.len()),
            ("first_gates", first_gates.len()),
            ("gate_spacings", gate_spacings.len()),
        ] {
            if entries != n {
                return Err(ModelError::MismatchedMomentTables {
                    moments: n,
                    table,
                    entries,
                });
            }
        }
        Ok(Self {
            ray_count,
            elevation_angle,
            moments,
            gate_counts,
            first_gates,
            gate_spacings,
        })
    }

    /// Build a descriptor where every moment shares one geometry.
    pub fn uniform(
        ray_count: u32,
        elevation_angle: f32,
        moments: &[MomentId],
        geometry: MomentGeometry,
    ) -> Self {
        let n = moments.len();
        Self {
            ray_count,
            elevation_angle,
            moments: moments.to_vec(),
            gate_counts: vec![geometry.gate_count; n],
            first_gates: vec![geometry.first_gate; n],
            gate_spacings: vec![geometry.gate_spacing; n],
        }
    }

    /// Number of rays in this sweep.
    pub fn ray_count(&self) -> u32 {
        self.ray_count
    }

    /// Target elevation angle, degrees.
    pub fn elevation_angle(&self) -> f32 {
        self.elevation_angle
    }

    /// Moments recorded in this sweep, in archive order.
    pub fn moments(&self) -> &[MomentId] {
        &self.moments
    }

    /// Whether this sweep recorded the given moment.
    pub fn has_moment(&self, moment: MomentId) -> bool {
        self.moments.contains(&moment)
    }

    /// Sampling geometry for one moment, if the sweep recorded it.
    pub fn geometry(&self, moment: MomentId) -> Option<MomentGeometry> {
        let i = self.moments.iter().position(|&m| m == moment)?;
        Some(MomentGeometry {
            gate_count: self.gate_counts[i],
            first_gate: self.first_gates[i],
            gate_spacing: self.gate_spacings[i],
        })
    }

    /// Iterate `(moment, geometry)` pairs in archive order.
    pub fn iter_geometries(&self) -> impl Iterator<Item = (MomentId, MomentGeometry)> + '_ {
        self.moments.iter().enumerate().map(|(i, &moment)| {
            (
                moment,
                MomentGeometry {
                    gate_count: self.gate_counts[i],
                    first_gate: self.first_gates[i],
                    gate_spacing: self.gate_spacings[i],
                },
            )
        })
    }
}

/// Ordered sweep descriptors for one volume, with optional archive
/// metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanCatalog {
    sweeps: Vec<SweepDescriptor>,
    vcp_pattern: Option<u16>,
    start_time: Option<DateTime<Utc>>,
}

impl ScanCatalog {
    /// Create a catalog from ordered sweep descriptors.
    pub fn new(sweeps: Vec<SweepDescriptor>) -> Self {
        Self {
            sweeps,
            vcp_pattern: None,
            start_time: None,
        }
    }

    /// Attach the volume coverage pattern number.
    pub fn with_vcp_pattern(mut self, vcp: u16) -> Self {
        self.vcp_pattern = Some(vcp);
        self
    }

    /// Attach the collection start time.
    pub fn with_start_time(mut self, time: DateTime<Utc>) -> Self {
        self.start_time = Some(time);
        self
    }

    /// All sweeps, in scan order.
    pub fn sweeps(&self) -> &[SweepDescriptor] {
        &self.sweeps
    }

    /// One sweep by index.
    pub fn sweep(&self, index: usize) -> Option<&SweepDescriptor> {
        self.sweeps.get(index)
    }

    /// Number of sweeps.
    pub fn len(&self) -> usize {
        self.sweeps.len()
    }

    /// Whether the catalog has no sweeps.
    pub fn is_empty(&self) -> bool {
        self.sweeps.is_empty()
    }

    /// Volume coverage pattern number, when the archive reported one.
    pub fn vcp_pattern(&self) -> Option<u16> {
        self.vcp_pattern
    }

    /// Collection start time, when the archive reported one.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Total ray count across all sweeps.
    pub fn total_rays(&self) -> usize {
        self.sweeps.iter().map(|s| s.ray_count as usize).sum()
    }

    /// Half-open ray index range of one sweep within the volume-wide
    /// ray-major ordering.
    pub fn ray_range(&self, sweep: usize) -> Option<Range<usize>> {
        if sweep >= self.sweeps.len() {
            return None;
        }
        let start: usize = self.sweeps[..sweep]
            .iter()
            .map(|s| s.ray_count as usize)
            .sum();
        Some(start..start + self.sweeps[sweep].ray_count as usize)
    }

    /// Ray ranges for every sweep, in scan order.
    pub fn sweep_ray_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::with_capacity(self.sweeps.len());
        let mut start = 0;
        for sweep in &self.sweeps {
            let end = start + sweep.ray_count as usize;
            ranges.push(start..end);
            start = end;
        }
        ranges
    }

    /// Union of recorded moments across all sweeps, sorted.
    pub fn available_moments(&self) -> Vec<MomentId> {
        self.sweeps
            .iter()
            .flat_map(|s| s.moments().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Target elevation angles per sweep, in scan order.
    pub fn elevation_angles(&self) -> Vec<f32> {
        self.sweeps.iter().map(|s| s.elevation_angle).collect()
    }

    /// Restrict the catalog to the given sweeps, in the given order.
    pub fn subset(&self, sweeps: &[usize]) -> Result<Self> {
        let mut selected = Vec::with_capacity(sweeps.len());
        for &index in sweeps {
            let sweep = self
                .sweeps
                .get(index)
                .ok_or(ModelError::SweepOutOfRange {
                    index,
                    len: self.sweeps.len(),
                })?;
            selected.push(sweep.clone());
        }
        Ok(Self {
            sweeps: selected,
            vcp_pattern: self.vcp_pattern,
            start_time: self.start_time,
        })
    }
}
