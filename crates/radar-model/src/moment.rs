//! Radar moment identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A measured quantity recorded at every range gate of a ray.
///
/// The serialized form is the archive's own abbreviation (`REF`, `VEL`,
/// ...), which is also what [`MomentId::abbreviation`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MomentId {
    /// Base reflectivity (REF).
    #[serde(rename = "REF")]
    Reflectivity,
    /// Mean Doppler velocity (VEL).
    #[serde(rename = "VEL")]
    Velocity,
    /// Doppler spectrum width (SW).
    #[serde(rename = "SW")]
    SpectrumWidth,
    /// Differential reflectivity (ZDR).
    #[serde(rename = "ZDR")]
    DifferentialReflectivity,
    /// Differential phase (PHI).
    #[serde(rename = "PHI")]
    DifferentialPhase,
    /// Cross correlation ratio (RHO).
    #[serde(rename = "RHO")]
    CorrelationCoefficient,
    /// Clutter filter power removed (CFP).
    #[serde(rename = "CFP")]
    ClutterFilterPower,
}

impl MomentId {
    /// Every moment an archive can record, in conventional archive order.
    pub const ALL: [MomentId; 7] = [
        MomentId::Reflectivity,
        MomentId::Velocity,
        MomentId::SpectrumWidth,
        MomentId::DifferentialReflectivity,
        MomentId::DifferentialPhase,
        MomentId::CorrelationCoefficient,
        MomentId::ClutterFilterPower,
    ];

    /// The abbreviation used in archive headers.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            MomentId::Reflectivity => "REF",
            MomentId::Velocity => "VEL",
            MomentId::SpectrumWidth => "SW",
            MomentId::DifferentialReflectivity => "ZDR",
            MomentId::DifferentialPhase => "PHI",
            MomentId::CorrelationCoefficient => "RHO",
            MomentId::ClutterFilterPower => "CFP",
        }
    }

    /// Parse an archive abbreviation (case-insensitive).
    pub fn from_abbreviation(s: &str) -> Option<Self> {
        MomentId::ALL
            .iter()
            .copied()
            .find(|m| m.abbreviation().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for MomentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}
