//! Dataset loading.
//!
//! Benchmark numbers live in a versioned JSON file so a new sweep does not need a code
//! change. The sweep shipped with the repository is embedded as the default.

use std::path::Path;

use threshold_report_core::{BenchmarkDataset, DATASET_SCHEMA_VERSION, SampleStore};

use crate::error::HarnessError;

/// `data/allocator_thresholds.v1.json`, embedded at build time.
pub const EMBEDDED_DATASET: &str = include_str!("../../../data/allocator_thresholds.v1.json");

/// Parse a dataset and reject unknown schema versions.
pub fn dataset_from_json(json: &str) -> Result<BenchmarkDataset, HarnessError> {
    let dataset: BenchmarkDataset = serde_json::from_str(json)?;
    if dataset.schema_version != DATASET_SCHEMA_VERSION {
        return Err(HarnessError::UnsupportedSchema {
            found: dataset.schema_version,
            expected: DATASET_SCHEMA_VERSION,
        });
    }
    Ok(dataset)
}

/// Load and validate a dataset file into a store.
pub fn load_store(path: &Path) -> Result<SampleStore, HarnessError> {
    let content = std::fs::read_to_string(path)?;
    store_from_json(&content)
}

pub fn store_from_json(json: &str) -> Result<SampleStore, HarnessError> {
    let dataset = dataset_from_json(json)?;
    Ok(SampleStore::from_dataset(dataset)?)
}

/// Store for `path`, or for the embedded sweep when `path` is `None`.
pub fn load_store_or_embedded(path: Option<&Path>) -> Result<SampleStore, HarnessError> {
    match path {
        Some(path) => load_store(path),
        None => store_from_json(EMBEDDED_DATASET),
    }
}
