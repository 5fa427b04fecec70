//! Metrics computed from, but not stored in, the sample store.

use crate::error::{ReportError, Result};
use crate::metric::Metric;
use crate::store::SampleStore;

/// Divisor turning byte counts into megabytes (decimal, as reported by the allocator sweep).
pub const MEGABYTE: f64 = 1e6;

/// Pure derivations over a borrowed [`SampleStore`].
#[derive(Debug, Clone, Copy)]
pub struct MetricDeriver<'a> {
    store: &'a SampleStore,
}

impl<'a> MetricDeriver<'a> {
    #[must_use]
    pub const fn new(store: &'a SampleStore) -> Self {
        Self { store }
    }

    /// Execution time at the smallest threshold over execution time at the largest.
    ///
    /// A zero final execution time, or one so small the ratio overflows, yields
    /// [`ReportError::DivisionByZero`]; the ratio is never reported as infinity or NaN.
    pub fn speedup(&self, scenario: &str) -> Result<f64> {
        let sample = self.store.scenario(scenario)?;
        let (Some(first), Some(last)) = (sample.samples().first(), sample.samples().last()) else {
            return Err(ReportError::validation(
                scenario,
                Metric::ExecutionTime.as_str(),
                "scenario has no samples",
            ));
        };
        let ratio = first.execution_time / last.execution_time;
        if last.execution_time == 0.0 || !ratio.is_finite() {
            return Err(ReportError::DivisionByZero {
                scenario: scenario.to_string(),
            });
        }
        Ok(ratio)
    }

    /// Byte sequence `metric` of `scenario`, divided elementwise by `unit_divisor`.
    pub fn normalized_memory(
        &self,
        scenario: &str,
        metric: Metric,
        unit_divisor: f64,
    ) -> Result<Vec<f64>> {
        let sample = self.store.scenario(scenario)?;
        if !metric.is_byte_count() {
            return Err(ReportError::validation(
                scenario,
                metric.as_str(),
                "memory normalization needs a byte-count metric",
            ));
        }
        if !(unit_divisor.is_finite() && unit_divisor > 0.0) {
            return Err(ReportError::validation(
                scenario,
                metric.as_str(),
                format!("unit divisor {unit_divisor} must be finite and positive"),
            ));
        }
        let bytes = sample.byte_series(metric).ok_or_else(|| {
            ReportError::validation(
                scenario,
                metric.as_str(),
                "scenario does not report this byte sequence",
            )
        })?;
        bytes
            .into_iter()
            .map(|b| {
                let value = b as f64 / unit_divisor;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ReportError::validation(
                        scenario,
                        metric.as_str(),
                        format!("{b} bytes / {unit_divisor} is not a finite value"),
                    ))
                }
            })
            .collect()
    }
}
