//! Report assembly and markdown rendering.
//!
//! [`build_report`] runs the whole pipeline (store -> deriver -> composer) and either
//! returns a complete [`ThresholdReport`] or the first error; there is no partial report.

use serde::{Deserialize, Serialize};
use threshold_report_core::{Metric, MetricDeriver, ReportError, SampleStore, SeriesComposer};

use crate::charts::{ChartSpec, LegendEntry, SeriesChart, SummaryChart, format_value};
use crate::config::ReportConfig;
use crate::error::HarnessError;
use crate::narrative;
use crate::structured_log::now_utc;

pub const REPORT_SCHEMA_VERSION: &str = "v1";

/// Byte sequences drawn in the memory chart, with their legend names.
const MEMORY_SERIES: [(Metric, &str); 2] = [
    (Metric::DataSegmentBytes, "Total Segment"),
    (Metric::FreeSpaceBytes, "Free Space"),
];

/// Everything a renderer needs: three threshold charts, the speedup summary and copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub schema_version: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub generated_at: String,
    pub thresholds: Vec<u64>,
    pub introduction: String,
    pub execution_time: SeriesChart,
    pub fragmentation: SeriesChart,
    pub memory: SeriesChart,
    pub speedup: SummaryChart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

/// Build the full report from a store.
pub fn build_report(store: &SampleStore, cfg: &ReportConfig) -> Result<ThresholdReport, HarnessError> {
    cfg.validate()?;
    let names = cfg.scenario_names(store)?;
    let composer = SeriesComposer::new(store);
    let deriver = MetricDeriver::new(store);

    let scenario_legend = names
        .iter()
        .map(|name| {
            store.scenario(name).map(|s| LegendEntry {
                key: s.name().to_string(),
                label: s.label().to_string(),
            })
        })
        .collect::<Result<Vec<_>, ReportError>>()?;

    let execution_time = SeriesChart {
        spec: ChartSpec::execution_time(),
        narrative: narrative::EXECUTION_TIME.to_string(),
        legend: scenario_legend.clone(),
        rows: composer.compose(Metric::ExecutionTime, &names)?,
    };

    let fragmentation = SeriesChart {
        spec: ChartSpec::fragmentation(),
        narrative: narrative::FRAGMENTATION.to_string(),
        legend: scenario_legend.clone(),
        rows: composer.compose(Metric::FragmentationRatio, &names)?,
    };

    let memory_scenario = store.scenario(&cfg.memory_scenario)?;
    let mut memory_rows = Vec::new();
    for (metric, _) in MEMORY_SERIES {
        if !memory_scenario.defines(metric) {
            return Err(ReportError::validation(
                memory_scenario.name(),
                metric.as_str(),
                "memory chart scenario does not report this byte sequence",
            )
            .into());
        }
        memory_rows.extend(composer.compose_scaled(
            metric,
            &[memory_scenario.name()],
            cfg.unit_divisor,
        )?);
    }
    let memory = SeriesChart {
        spec: ChartSpec::memory(memory_scenario.label(), &cfg.unit_label),
        narrative: narrative::memory(memory_scenario.label()),
        legend: MEMORY_SERIES
            .iter()
            .map(|(metric, label)| LegendEntry {
                key: metric.as_str().to_string(),
                label: (*label).to_string(),
            })
            .collect(),
        rows: memory_rows,
    };

    let speedup = SummaryChart {
        spec: ChartSpec::speedup(),
        narrative: narrative::SPEEDUP.to_string(),
        legend: scenario_legend,
        rows: composer.compose_summary(&names, |name| deriver.speedup(name))?,
    };

    Ok(ThresholdReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        title: store.title().to_string(),
        source: store.source().map(str::to_string),
        generated_at: cfg.timestamp.clone().unwrap_or_else(now_utc),
        thresholds: store.thresholds().as_slice().to_vec(),
        introduction: narrative::INTRODUCTION.to_string(),
        execution_time,
        fragmentation,
        memory,
        speedup,
        conclusion: store.conclusion().map(str::to_string),
    })
}

impl ThresholdReport {
    /// The three threshold charts in report order.
    #[must_use]
    pub fn series_charts(&self) -> [&SeriesChart; 3] {
        [&self.execution_time, &self.fragmentation, &self.memory]
    }

    /// Total long-form rows across all series charts.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.series_charts().iter().map(|c| c.rows.len()).sum::<usize>() + self.speedup.rows.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        writeln!(out, "# {}", self.title).ok();
        writeln!(out).ok();
        if let Some(source) = &self.source {
            writeln!(out, "- Source: {source}").ok();
        }
        writeln!(out, "- Generated: {}", self.generated_at).ok();
        writeln!(
            out,
            "- Thresholds (bytes): {}",
            self.thresholds
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )
        .ok();
        writeln!(out).ok();

        writeln!(out, "## Introduction").ok();
        writeln!(out).ok();
        writeln!(out, "{}", self.introduction).ok();
        writeln!(out).ok();

        for chart in self.series_charts() {
            render_series_section(&mut out, chart);
        }
        render_summary_section(&mut out, &self.speedup);

        if let Some(conclusion) = &self.conclusion {
            writeln!(out, "## Conclusion").ok();
            writeln!(out).ok();
            writeln!(out, "{conclusion}").ok();
        }
        out
    }
}

fn render_series_section(out: &mut String, chart: &SeriesChart) {
    use std::fmt::Write as _;

    let spec = &chart.spec;
    writeln!(out, "## {}", spec.title).ok();
    writeln!(out).ok();
    writeln!(out, "{}", chart.narrative).ok();
    writeln!(out).ok();
    writeln!(out, "_{}; y: {}_", spec.encoding_summary(), spec.y_label).ok();
    writeln!(out).ok();

    let table = chart.pivot();
    if table.columns.is_empty() {
        writeln!(out, "_No scenario reports this metric._").ok();
        writeln!(out).ok();
        return;
    }

    write!(out, "| {} |", spec.x_label).ok();
    for (label, _) in &table.columns {
        write!(out, " {label} |").ok();
    }
    writeln!(out).ok();
    write!(out, "|---:|").ok();
    for _ in &table.columns {
        write!(out, "---:|").ok();
    }
    writeln!(out).ok();

    for (i, threshold) in table.thresholds.iter().enumerate() {
        write!(out, "| {threshold} |").ok();
        for (_, values) in &table.columns {
            let cell = values[i].map_or_else(
                || "-".to_string(),
                |value| format_value(value, spec.value_format.as_deref()),
            );
            write!(out, " {cell} |").ok();
        }
        writeln!(out).ok();
    }
    writeln!(out).ok();
}

fn render_summary_section(out: &mut String, chart: &SummaryChart) {
    use std::fmt::Write as _;

    let spec = &chart.spec;
    writeln!(out, "## {}", spec.title).ok();
    writeln!(out).ok();
    writeln!(out, "{}", chart.narrative).ok();
    writeln!(out).ok();
    writeln!(out, "| {} | {} |", spec.x_label, spec.y_label).ok();
    writeln!(out, "|------|-----:|").ok();
    for row in &chart.rows {
        writeln!(
            out,
            "| {} | {} |",
            chart.label_for(&row.scenario),
            format_value(row.value, spec.value_format.as_deref())
        )
        .ok();
    }
    writeln!(out).ok();
}
