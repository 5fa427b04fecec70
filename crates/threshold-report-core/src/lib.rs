//! Benchmark aggregation for allocator size-class threshold sweeps.
//!
//! The pipeline is strictly linear:
//! - [`SampleStore`]: validated, immutable thresholds + per-scenario samples
//! - [`MetricDeriver`]: speedup factor and memory normalization
//! - [`SeriesComposer`]: long-form rows and per-scenario summaries for charting
//!
//! Rendering lives in `threshold-report-harness`.

#![deny(unsafe_code)]

pub mod compose;
pub mod dataset;
pub mod derive;
pub mod error;
pub mod metric;
pub mod store;

pub use compose::{LongFormRow, SeriesComposer, SummaryRow};
pub use dataset::{BenchmarkDataset, DATASET_SCHEMA_VERSION, ScenarioRecord};
pub use derive::{MEGABYTE, MetricDeriver};
pub use error::{ReportError, Result};
pub use metric::Metric;
pub use store::{SampleStore, ScenarioSample, ThresholdConfig, ThresholdSample};
