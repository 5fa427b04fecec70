//! Report configuration.
//!
//! Everything here comes from CLI flags; no environment variables are consulted.
//! Defaults reproduce the report layout the sweep was published with.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use threshold_report_core::{MEGABYTE, ReportError, SampleStore};

use crate::error::HarnessError;

const DEFAULT_MEMORY_SCENARIO: &str = "small_alloc";
const DEFAULT_UNIT_LABEL: &str = "MB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Divisor applied to byte counts in the memory chart.
    pub unit_divisor: f64,
    /// Unit name shown on the memory axis.
    pub unit_label: String,
    /// Scenarios for the time, fragmentation and speedup charts. `None` = all, in
    /// dataset order.
    pub scenarios: Option<Vec<String>>,
    /// Scenario whose data-segment/free-space bytes feed the memory chart.
    pub memory_scenario: String,
    /// Fixed timestamp for reproducible output.
    pub timestamp: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            unit_divisor: MEGABYTE,
            unit_label: DEFAULT_UNIT_LABEL.to_string(),
            scenarios: None,
            memory_scenario: DEFAULT_MEMORY_SCENARIO.to_string(),
            timestamp: None,
        }
    }
}

impl ReportConfig {
    /// Reject settings that cannot produce a report before any work is done.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if !(self.unit_divisor.is_finite() && self.unit_divisor > 0.0) {
            return Err(HarnessError::Config(format!(
                "unit divisor {} must be finite and positive",
                self.unit_divisor
            )));
        }
        if self.unit_label.trim().is_empty() {
            return Err(HarnessError::Config("unit label must not be empty".to_string()));
        }
        if let Some(names) = &self.scenarios
            && names.is_empty()
        {
            return Err(HarnessError::Config(
                "scenario selection must name at least one scenario".to_string(),
            ));
        }
        Ok(())
    }

    /// Selected scenario names, checked against `store`. A repeated name keeps its first
    /// position only, so legends line up with composed rows.
    pub fn scenario_names<'a>(&'a self, store: &'a SampleStore) -> Result<Vec<&'a str>, ReportError> {
        let Some(names) = &self.scenarios else {
            return Ok(store.scenario_names());
        };
        let mut seen = BTreeSet::new();
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            store.scenario(name)?;
            if seen.insert(name.as_str()) {
                selected.push(name.as_str());
            }
        }
        Ok(selected)
    }
}
