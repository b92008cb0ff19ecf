//! Moment to output-field mapping.
//!
//! The [`FieldTable`] decides which archive moments become fields of the
//! assembled volume and what those fields are called. A moment without a
//! table entry, or whose output name is excluded, is dropped everywhere:
//! it never enters range-grid or interpolation-plan computation and
//! produces no output field.

use crate::error::Result;
use crate::moment::MomentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Output metadata for a single radar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Output field name, e.g. `reflectivity`.
    pub name: String,
    /// Physical units, e.g. `dBZ`.
    #[serde(default)]
    pub units: String,
    /// Human readable description.
    #[serde(default)]
    pub long_name: String,
}

impl FieldEntry {
    /// Create a field entry.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        long_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            long_name: long_name.into(),
        }
    }
}

/// Maps archive moments to the fields of the assembled volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTable {
    fields: BTreeMap<MomentId, FieldEntry>,
    /// Output field names to drop, applied after the mapping.
    #[serde(default)]
    exclude: HashSet<String>,
}

impl FieldTable {
    /// The standard moment mapping with CF-style field names.
    pub fn standard() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            MomentId::Reflectivity,
            FieldEntry::new("reflectivity", "dBZ", "Reflectivity"),
        );
        fields.insert(
            MomentId::Velocity,
            FieldEntry::new("velocity", "meters_per_second", "Mean Doppler velocity"),
        );
        fields.insert(
            MomentId::SpectrumWidth,
            FieldEntry::new("spectrum_width", "meters_per_second", "Doppler spectrum width"),
        );
        fields.insert(
            MomentId::DifferentialReflectivity,
            FieldEntry::new("differential_reflectivity", "dB", "Differential reflectivity"),
        );
        fields.insert(
            MomentId::DifferentialPhase,
            FieldEntry::new("differential_phase", "degrees", "Differential phase (PhiDP)"),
        );
        fields.insert(
            MomentId::CorrelationCoefficient,
            FieldEntry::new("cross_correlation_ratio", "ratio", "Cross correlation ratio (RHOHV)"),
        );
        fields.insert(
            MomentId::ClutterFilterPower,
            FieldEntry::new("clutter_filter_power_removed", "dB", "Clutter filter power removed"),
        );
        Self {
            fields,
            exclude: HashSet::new(),
        }
    }

    /// A table that names each field after its raw archive abbreviation.
    pub fn file_names() -> Self {
        let fields = MomentId::ALL
            .iter()
            .map(|&m| (m, FieldEntry::new(m.abbreviation(), "", "")))
            .collect();
        Self {
            fields,
            exclude: HashSet::new(),
        }
    }

    /// Load a table from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a table from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Add output field names to the exclusion list.
    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Replace or add the entry for a moment.
    pub fn insert(&mut self, moment: MomentId, entry: FieldEntry) {
        self.fields.insert(moment, entry);
    }

    /// Remove the entry for a moment, excluding it from output.
    pub fn remove(&mut self, moment: MomentId) {
        self.fields.remove(&moment);
    }

    /// The output entry for a moment, or `None` if the moment is not
    /// selected for output.
    pub fn field_for(&self, moment: MomentId) -> Option<&FieldEntry> {
        self.fields
            .get(&moment)
            .filter(|entry| !self.exclude.contains(&entry.name))
    }

    /// The output field name for a moment, if selected.
    pub fn field_name_for(&self, moment: MomentId) -> Option<&str> {
        self.field_for(moment).map(|entry| entry.name.as_str())
    }

    /// Whether a moment is selected for output.
    pub fn is_selected(&self, moment: MomentId) -> bool {
        self.field_for(moment).is_some()
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::standard()
    }
}
