//! In-place gate interpolation for coarse-resolution sweeps.

use radar_model::RayBlock;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Stride between real coarse samples on the common grid.
const COARSE_STRIDE: usize = 4;

/// How the gates between two real coarse samples are synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpMethod {
    /// Distance-weighted blend of the two neighboring real samples.
    #[default]
    Linear,
    /// Copy of the nearer real sample; the midpoint ties toward the
    /// lower gate.
    Nearest,
}

/// Fill the synthesized gates of one sweep's rays in place.
///
/// `block` holds the moment's full-volume rays on the common grid, on
/// the filled representation ([`RayBlock::fill`]), with the sweep's real
/// samples at every fourth column and fill values between them. `rays`
/// is the sweep's ray range within the block and `native_gate_count` the
/// number of real coarse samples per ray.
///
/// A span whose neighboring real sample carries the fill value stays
/// filled, and gates past the last real sample are never written: no
/// value is invented beyond what the sweep measured.
pub fn interpolate_sweep(
    block: &mut RayBlock,
    rays: Range<usize>,
    native_gate_count: usize,
    fill_value: f32,
    method: InterpMethod,
) {
    let gates = block.gates();
    for ray in rays {
        let row = block.row_mut(ray);
        for k in 1..native_gate_count {
            let hi = k * COARSE_STRIDE;
            if hi >= gates {
                break;
            }
            let lo = hi - COARSE_STRIDE;
            let v0 = row[lo];
            let v1 = row[hi];
            if v0 == fill_value || v1 == fill_value {
                continue;
            }
            match method {
                InterpMethod::Linear => {
                    let delta = (v1 - v0) / 4.0;
                    row[lo + 1] = v0 + delta;
                    row[lo + 2] = v0 + 2.0 * delta;
                    row[lo + 3] = v0 + 3.0 * delta;
                }
                InterpMethod::Nearest => {
                    row[lo + 1] = v0;
                    row[lo + 2] = v0;
                    row[lo + 3] = v1;
                }
            }
        }
    }
}
