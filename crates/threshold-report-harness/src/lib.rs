//! Report harness for allocator threshold sweeps.
//!
//! This crate provides:
//! - Dataset loading: versioned JSON sweeps, with the published sweep embedded
//! - Report assembly: chart datasets, legends and copy built from the core pipeline
//! - Rendering: markdown, plain text, JSON and Vega-Lite chart specs
//! - Structured logging: JSONL run logs and a SHA-256 artifact index

#![forbid(unsafe_code)]

pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod narrative;
pub mod render;
pub mod report;
pub mod structured_log;

pub use charts::{ChartKind, ChartSpec, LegendEntry, SeriesChart, SummaryChart};
pub use config::ReportConfig;
pub use dataset::{EMBEDDED_DATASET, load_store, load_store_or_embedded, store_from_json};
pub use error::HarnessError;
pub use report::{ThresholdReport, build_report};
