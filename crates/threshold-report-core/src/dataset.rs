//! Wire format of a benchmark dataset.
//!
//! This is the only place where scenario measurements live as parallel arrays
//! (index *i* of every sequence refers to `thresholds[i]`). [`crate::SampleStore`]
//! validates that alignment once and keeps one record per threshold afterwards.

use serde::{Deserialize, Serialize};

/// Dataset schema version this crate understands.
pub const DATASET_SCHEMA_VERSION: u32 = 1;

/// A full benchmark sweep: thresholds under test plus every scenario's samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkDataset {
    /// Schema version.
    pub schema_version: u32,
    /// Report title.
    pub title: String,
    /// Where the numbers came from (allocator build, machine, sweep name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Size-class cutoffs in bytes, strictly ascending.
    pub thresholds: Vec<u64>,
    /// Closing remarks specific to this sweep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    /// Allocation-pattern scenarios, in legend order.
    pub scenarios: Vec<ScenarioRecord>,
}

/// One scenario's measurements, one entry per threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Stable key (`small_alloc`).
    pub name: String,
    /// Legend name (`Small Range`). Falls back to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub execution_time: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragmentation_ratio: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_segment_bytes: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_space_bytes: Option<Vec<u64>>,
}

impl ScenarioRecord {
    /// Record with execution times only.
    #[must_use]
    pub fn new(name: impl Into<String>, execution_time: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            label: None,
            execution_time,
            fragmentation_ratio: None,
            data_segment_bytes: None,
            free_space_bytes: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_fragmentation(mut self, ratios: Vec<f64>) -> Self {
        self.fragmentation_ratio = Some(ratios);
        self
    }

    /// Set both memory-segment sequences.
    #[must_use]
    pub fn with_memory(mut self, data_segment_bytes: Vec<u64>, free_space_bytes: Vec<u64>) -> Self {
        self.data_segment_bytes = Some(data_segment_bytes);
        self.free_space_bytes = Some(free_space_bytes);
        self
    }
}
