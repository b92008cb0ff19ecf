//! Test data generation utilities.
//!
//! Deterministic catalogs and in-memory [`MomentSource`] implementations
//! used across the unit and integration tests. The geometries mirror a
//! real mixed-resolution archive: a 250 m fine grid and the matching
//! 1000 m coarse grid whose first gate sits one and a half fine spacings
//! past the fine first gate.

use crate::loader::MomentSource;
use anyhow::{anyhow, bail};
use radar_model::{MomentGeometry, MomentId, RayBlock, ScanCatalog, SweepDescriptor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// First fine gate used by the test catalogs, meters.
pub const FINE_FIRST: f64 = 1000.0;
/// Fine gate spacing used by the test catalogs, meters.
pub const FINE_SPACING: f64 = 250.0;

/// Geometry of a moment sampled on the fine grid.
pub fn fine_geometry(gate_count: u32) -> MomentGeometry {
    MomentGeometry {
        gate_count,
        first_gate: FINE_FIRST,
        gate_spacing: FINE_SPACING,
    }
}

/// The matching coarse geometry: four times the fine spacing, first
/// gate one and a half fine spacings past the fine first gate.
pub fn coarse_geometry(gate_count: u32) -> MomentGeometry {
    MomentGeometry {
        gate_count,
        first_gate: FINE_FIRST + 1.5 * FINE_SPACING,
        gate_spacing: 4.0 * FINE_SPACING,
    }
}

/// A catalog where every sweep samples every moment on the fine grid.
pub fn uniform_catalog(
    nsweeps: usize,
    nrays: u32,
    gate_count: u32,
    moments: &[MomentId],
) -> ScanCatalog {
    let sweeps = (0..nsweeps)
        .map(|i| {
            SweepDescriptor::uniform(nrays, 0.5 + i as f32, moments, fine_geometry(gate_count))
        })
        .collect();
    ScanCatalog::new(sweeps)
}

/// A catalog with `fine_sweeps` sweeps sampling reflectivity and
/// velocity on the fine grid, followed by `coarse_sweeps` sweeps where
/// reflectivity drops to the coarse grid (`coarse_gates` real samples)
/// while velocity stays fine.
pub fn mixed_resolution_catalog(
    fine_sweeps: usize,
    coarse_sweeps: usize,
    nrays: u32,
    fine_gates: u32,
    coarse_gates: u32,
) -> ScanCatalog {
    let moments = [MomentId::Reflectivity, MomentId::Velocity];
    let mut sweeps = Vec::with_capacity(fine_sweeps + coarse_sweeps);
    for i in 0..fine_sweeps {
        sweeps.push(SweepDescriptor::uniform(
            nrays,
            0.5 + i as f32,
            &moments,
            fine_geometry(fine_gates),
        ));
    }
    for i in 0..coarse_sweeps {
        let fine = fine_geometry(fine_gates);
        let coarse = coarse_geometry(coarse_gates);
        let sweep = SweepDescriptor::new(
            nrays,
            0.5 + (fine_sweeps + i) as f32,
            moments.to_vec(),
            vec![coarse.gate_count, fine.gate_count],
            vec![coarse.first_gate, fine.first_gate],
            vec![coarse.gate_spacing, fine.gate_spacing],
        )
        .expect("parallel tables have equal length");
        sweeps.push(sweep);
    }
    ScanCatalog::new(sweeps)
}

/// Write a coarse ray's real samples at every fourth common-grid column
/// of `block`, leaving the gates between and past them "no data".
pub fn scatter_coarse_row(block: &mut RayBlock, ray: usize, values: &[f32]) {
    for (k, &value) in values.iter().enumerate() {
        block.set(ray, k * 4, value);
    }
}

/// An in-memory source serving pre-built blocks and counting reads.
#[derive(Default)]
pub struct StaticSource {
    blocks: HashMap<MomentId, RayBlock>,
    reads: AtomicUsize,
    last_sweeps: Mutex<Option<Vec<usize>>>,
}

impl StaticSource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the block served for a moment.
    pub fn with_block(mut self, moment: MomentId, block: RayBlock) -> Self {
        self.blocks.insert(moment, block);
        self
    }

    /// Number of reads served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// The sweep subset passed to the most recent read.
    pub fn last_sweeps(&self) -> Option<Vec<usize>> {
        self.last_sweeps.lock().unwrap().clone()
    }
}

impl MomentSource for StaticSource {
    fn read_moment(
        &self,
        moment: MomentId,
        gate_count: usize,
        sweeps: Option<&[usize]>,
    ) -> anyhow::Result<RayBlock> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        *self.last_sweeps.lock().unwrap() = sweeps.map(<[usize]>::to_vec);
        let block = self
            .blocks
            .get(&moment)
            .ok_or_else(|| anyhow!("no block stored for moment {moment}"))?;
        if block.gates() != gate_count {
            bail!(
                "stored block has {} gates, caller asked for {gate_count}",
                block.gates()
            );
        }
        Ok(block.clone())
    }
}

/// A source whose every read fails, for error propagation tests.
pub struct FailingSource;

impl MomentSource for FailingSource {
    fn read_moment(
        &self,
        _moment: MomentId,
        _gate_count: usize,
        _sweeps: Option<&[usize]>,
    ) -> anyhow::Result<RayBlock> {
        bail!("archive read failed")
    }
}
