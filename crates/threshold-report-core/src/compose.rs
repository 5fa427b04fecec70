//! Long-form series composition.
//!
//! Output ordering is scenario-major, then threshold-ascending, following the order of
//! the requested scenario names. Repeated names are emitted once, at their first position.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::derive::MetricDeriver;
use crate::error::Result;
use crate::metric::Metric;
use crate::store::SampleStore;

/// One `(threshold, scenario, metric, value)` observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongFormRow {
    pub threshold: u64,
    pub scenario: String,
    pub metric: String,
    pub value: f64,
}

/// One value per scenario (speedup summary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub scenario: String,
    pub value: f64,
}

/// Flattens store sequences into rows for multi-series charts.
#[derive(Debug, Clone, Copy)]
pub struct SeriesComposer<'a> {
    store: &'a SampleStore,
}

impl<'a> SeriesComposer<'a> {
    #[must_use]
    pub const fn new(store: &'a SampleStore) -> Self {
        Self { store }
    }

    /// Rows for `metric` across `scenario_names`.
    ///
    /// Scenarios that do not report `metric` are skipped; an unknown name is an error.
    pub fn compose<S: AsRef<str>>(
        &self,
        metric: Metric,
        scenario_names: &[S],
    ) -> Result<Vec<LongFormRow>> {
        let mut rows = Vec::new();
        for name in unique(scenario_names) {
            let scenario = self.store.scenario(name)?;
            if !scenario.defines(metric) {
                continue;
            }
            rows.extend(scenario.samples().iter().filter_map(|sample| {
                sample.value(metric).map(|value| LongFormRow {
                    threshold: sample.threshold,
                    scenario: scenario.name().to_string(),
                    metric: metric.as_str().to_string(),
                    value,
                })
            }));
        }
        Ok(rows)
    }

    /// [`Self::compose`] keyed by metric name.
    ///
    /// A name no scenario reports, including one outside [`Metric::ALL`], yields no rows.
    /// Unknown scenario names still fail with [`crate::ReportError::NotFound`].
    pub fn compose_by_name<S: AsRef<str>>(
        &self,
        metric_name: &str,
        scenario_names: &[S],
    ) -> Result<Vec<LongFormRow>> {
        if let Some(metric) = Metric::from_str_loose(metric_name) {
            return self.compose(metric, scenario_names);
        }
        for name in unique(scenario_names) {
            self.store.scenario(name)?;
        }
        Ok(Vec::new())
    }

    /// Like [`Self::compose`] for a byte-count metric, with every value divided by
    /// `unit_divisor` (see [`MetricDeriver::normalized_memory`]).
    pub fn compose_scaled<S: AsRef<str>>(
        &self,
        metric: Metric,
        scenario_names: &[S],
        unit_divisor: f64,
    ) -> Result<Vec<LongFormRow>> {
        let deriver = MetricDeriver::new(self.store);
        let thresholds = self.store.thresholds();
        let mut rows = Vec::new();
        for name in unique(scenario_names) {
            let scenario = self.store.scenario(name)?;
            if !scenario.defines(metric) {
                continue;
            }
            let values = deriver.normalized_memory(name, metric, unit_divisor)?;
            rows.extend(
                thresholds
                    .iter()
                    .zip(values)
                    .map(|(threshold, value)| LongFormRow {
                        threshold,
                        scenario: scenario.name().to_string(),
                        metric: metric.as_str().to_string(),
                        value,
                    }),
            );
        }
        Ok(rows)
    }

    /// One row per scenario, computed by `metric_fn`. The first error aborts composition.
    pub fn compose_summary<S, F>(&self, scenario_names: &[S], mut metric_fn: F) -> Result<Vec<SummaryRow>>
    where
        S: AsRef<str>,
        F: FnMut(&str) -> Result<f64>,
    {
        unique(scenario_names)
            .into_iter()
            .map(|name| -> Result<SummaryRow> {
                let scenario = self.store.scenario(name)?;
                Ok(SummaryRow {
                    scenario: scenario.name().to_string(),
                    value: metric_fn(name)?,
                })
            })
            .collect()
    }
}

fn unique<S: AsRef<str>>(names: &[S]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| seen.insert(*name))
        .collect()
}
