//! Immutable sample store built from a validated [`BenchmarkDataset`].

use std::collections::BTreeMap;

use crate::dataset::{BenchmarkDataset, ScenarioRecord};
use crate::error::{ReportError, Result};
use crate::metric::Metric;

/// Size-class cutoffs under test: non-empty, strictly ascending, every value > 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdConfig {
    values: Vec<u64>,
}

impl ThresholdConfig {
    pub fn new(values: Vec<u64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ReportError::InvalidThresholds {
                reason: "at least one threshold is required".to_string(),
            });
        }
        if let Some(pos) = values.iter().position(|&v| v == 0) {
            return Err(ReportError::InvalidThresholds {
                reason: format!("threshold at index {pos} must be positive"),
            });
        }
        if let Some(pos) = values.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ReportError::InvalidThresholds {
                reason: format!(
                    "thresholds must be strictly ascending: {} at index {} is followed by {}",
                    values[pos],
                    pos,
                    values[pos + 1]
                ),
            });
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed config; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.values.iter().copied()
    }
}

/// Every measurement a scenario reported for one threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSample {
    pub threshold: u64,
    pub execution_time: f64,
    pub fragmentation_ratio: Option<f64>,
    pub data_segment_bytes: Option<u64>,
    pub free_space_bytes: Option<u64>,
}

impl ThresholdSample {
    /// Value of `metric` at this threshold, widened to `f64`.
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::ExecutionTime => Some(self.execution_time),
            Metric::FragmentationRatio => self.fragmentation_ratio,
            Metric::DataSegmentBytes => self.data_segment_bytes.map(|b| b as f64),
            Metric::FreeSpaceBytes => self.free_space_bytes.map(|b| b as f64),
        }
    }

    #[must_use]
    pub fn bytes(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::DataSegmentBytes => self.data_segment_bytes,
            Metric::FreeSpaceBytes => self.free_space_bytes,
            Metric::ExecutionTime | Metric::FragmentationRatio => None,
        }
    }
}

/// One allocation-pattern scenario, one [`ThresholdSample`] per configured threshold.
///
/// A metric is either reported at every threshold or at none of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSample {
    name: String,
    label: Option<String>,
    samples: Vec<ThresholdSample>,
}

impl ScenarioSample {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Legend name, or the scenario key when no label was given.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Samples in threshold order.
    #[must_use]
    pub fn samples(&self) -> &[ThresholdSample] {
        &self.samples
    }

    #[must_use]
    pub fn defines(&self, metric: Metric) -> bool {
        self.samples
            .first()
            .is_some_and(|sample| sample.value(metric).is_some())
    }

    /// Metrics this scenario reports, in [`Metric::ALL`] order.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|&metric| self.defines(metric))
            .collect()
    }

    /// Parallel-array view of one metric. Returns a fresh copy on every call.
    #[must_use]
    pub fn series(&self, metric: Metric) -> Option<Vec<f64>> {
        self.samples
            .iter()
            .map(|sample| sample.value(metric))
            .collect()
    }

    #[must_use]
    pub fn byte_series(&self, metric: Metric) -> Option<Vec<u64>> {
        self.samples
            .iter()
            .map(|sample| sample.bytes(metric))
            .collect()
    }
}

/// Read-only table of thresholds and scenario samples.
///
/// Construction is the single validation point; nothing mutates a store afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStore {
    title: String,
    source: Option<String>,
    conclusion: Option<String>,
    thresholds: ThresholdConfig,
    scenarios: Vec<ScenarioSample>,
    by_name: BTreeMap<String, usize>,
}

impl SampleStore {
    /// Validate a dataset and build the store.
    ///
    /// Fails with [`ReportError::InvalidThresholds`] for a malformed threshold list and
    /// [`ReportError::Validation`] naming the first offending scenario/metric otherwise.
    pub fn from_dataset(dataset: BenchmarkDataset) -> Result<Self> {
        let thresholds = ThresholdConfig::new(dataset.thresholds)?;

        let mut scenarios = Vec::with_capacity(dataset.scenarios.len());
        let mut by_name = BTreeMap::new();
        for record in dataset.scenarios {
            let scenario = build_scenario(&thresholds, record)?;
            if by_name
                .insert(scenario.name.clone(), scenarios.len())
                .is_some()
            {
                return Err(ReportError::validation(
                    scenario.name,
                    "name",
                    "scenario name appears more than once",
                ));
            }
            scenarios.push(scenario);
        }

        Ok(Self {
            title: dataset.title,
            source: dataset.source,
            conclusion: dataset.conclusion,
            thresholds,
            scenarios,
            by_name,
        })
    }

    #[must_use]
    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn scenario(&self, name: &str) -> Result<&ScenarioSample> {
        self.by_name
            .get(name)
            .map(|&idx| &self.scenarios[idx])
            .ok_or_else(|| ReportError::NotFound {
                scenario: name.to_string(),
            })
    }

    /// Scenarios in dataset order.
    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioSample] {
        &self.scenarios
    }

    #[must_use]
    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(ScenarioSample::name).collect()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }
}

fn build_scenario(thresholds: &ThresholdConfig, record: ScenarioRecord) -> Result<ScenarioSample> {
    let name = record.name;
    if name.trim().is_empty() {
        return Err(ReportError::validation(
            "<unnamed>",
            "name",
            "scenario name must not be empty",
        ));
    }

    let expected = thresholds.len();
    check_len(&name, Metric::ExecutionTime, expected, Some(record.execution_time.len()))?;
    check_len(
        &name,
        Metric::FragmentationRatio,
        expected,
        record.fragmentation_ratio.as_ref().map(Vec::len),
    )?;
    check_len(
        &name,
        Metric::DataSegmentBytes,
        expected,
        record.data_segment_bytes.as_ref().map(Vec::len),
    )?;
    check_len(
        &name,
        Metric::FreeSpaceBytes,
        expected,
        record.free_space_bytes.as_ref().map(Vec::len),
    )?;

    if let Some((idx, value)) = record
        .execution_time
        .iter()
        .enumerate()
        .find(|&(_, v)| !v.is_finite() || *v < 0.0)
    {
        return Err(ReportError::validation(
            name,
            Metric::ExecutionTime.as_str(),
            format!("value {value} at index {idx} must be finite and non-negative"),
        ));
    }
    if let Some(ratios) = &record.fragmentation_ratio
        && let Some((idx, value)) = ratios
            .iter()
            .enumerate()
            .find(|&(_, v)| !(0.0..=1.0).contains(v))
    {
        return Err(ReportError::validation(
            name,
            Metric::FragmentationRatio.as_str(),
            format!("value {value} at index {idx} is outside [0, 1]"),
        ));
    }

    let samples = thresholds
        .iter()
        .enumerate()
        .map(|(i, threshold)| ThresholdSample {
            threshold,
            execution_time: record.execution_time[i],
            fragmentation_ratio: record.fragmentation_ratio.as_ref().map(|v| v[i]),
            data_segment_bytes: record.data_segment_bytes.as_ref().map(|v| v[i]),
            free_space_bytes: record.free_space_bytes.as_ref().map(|v| v[i]),
        })
        .collect();

    Ok(ScenarioSample {
        name,
        label: record.label,
        samples,
    })
}

fn check_len(scenario: &str, metric: Metric, expected: usize, actual: Option<usize>) -> Result<()> {
    match actual {
        Some(actual) if actual != expected => Err(ReportError::validation(
            scenario,
            metric.as_str(),
            format!("expected {expected} values (one per threshold), got {actual}"),
        )),
        _ => Ok(()),
    }
}
