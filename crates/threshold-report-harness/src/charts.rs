//! Chart datasets handed to renderers.
//!
//! A chart is a [`ChartSpec`] (visual encoding) plus the rows composed by the core crate.
//! Renderers never look at the sample store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use threshold_report_core::{LongFormRow, SummaryRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Row column that separates series (legend entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesField {
    Scenario,
    Metric,
}

/// Visual encoding of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Stable identifier (file names, anchors).
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    /// Legend title.
    pub series_label: String,
    pub series_field: SeriesField,
    pub log_x: bool,
    pub log_y: bool,
    pub markers: bool,
    /// Bars side by side per x value instead of stacked.
    pub grouped: bool,
    /// printf-style value annotation (`.2f`), when values are printed on the marks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_format: Option<String>,
}

impl ChartSpec {
    #[must_use]
    pub fn execution_time() -> Self {
        Self {
            id: "execution_time".to_string(),
            title: "Execution Time vs Threshold Size".to_string(),
            kind: ChartKind::Line,
            x_label: "Threshold Size".to_string(),
            y_label: "Execution Time (s)".to_string(),
            series_label: "Allocation Type".to_string(),
            series_field: SeriesField::Scenario,
            log_x: true,
            log_y: true,
            markers: true,
            grouped: false,
            value_format: None,
        }
    }

    #[must_use]
    pub fn fragmentation() -> Self {
        Self {
            id: "fragmentation".to_string(),
            title: "Fragmentation vs Threshold Size".to_string(),
            y_label: "Fragmentation Ratio".to_string(),
            log_y: false,
            ..Self::execution_time()
        }
    }

    #[must_use]
    pub fn memory(scenario_label: &str, unit_label: &str) -> Self {
        Self {
            id: "memory_usage".to_string(),
            title: format!("Memory Usage for {scenario_label}"),
            kind: ChartKind::Bar,
            x_label: "Threshold Size".to_string(),
            y_label: format!("Memory Size ({unit_label})"),
            series_label: "Type".to_string(),
            series_field: SeriesField::Metric,
            log_x: false,
            log_y: false,
            markers: false,
            grouped: true,
            value_format: None,
        }
    }

    #[must_use]
    pub fn speedup() -> Self {
        Self {
            id: "speedup".to_string(),
            title: "Performance Improvement Summary".to_string(),
            kind: ChartKind::Bar,
            x_label: "Allocation Type".to_string(),
            y_label: "Speedup Factor".to_string(),
            series_label: "Allocation Type".to_string(),
            series_field: SeriesField::Scenario,
            log_x: false,
            log_y: false,
            markers: false,
            grouped: false,
            value_format: Some(".2f".to_string()),
        }
    }

    /// Short human description of the encoding (`line · markers · log x`).
    #[must_use]
    pub fn encoding_summary(&self) -> String {
        let mut parts = vec![match self.kind {
            ChartKind::Line => "line chart",
            ChartKind::Bar if self.grouped => "grouped bar chart",
            ChartKind::Bar => "bar chart",
        }];
        if self.markers {
            parts.push("markers");
        }
        if self.log_x {
            parts.push("log x");
        }
        if self.log_y {
            parts.push("log y");
        }
        parts.join(" · ")
    }
}

/// Legend key -> display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub key: String,
    pub label: String,
}

/// A multi-series chart over thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesChart {
    pub spec: ChartSpec,
    pub narrative: String,
    pub legend: Vec<LegendEntry>,
    pub rows: Vec<LongFormRow>,
}

/// Pivoted table view: one row per threshold, one column per series.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub thresholds: Vec<u64>,
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl SeriesChart {
    /// Key of the series `row` belongs to.
    #[must_use]
    pub fn series_key<'r>(&self, row: &'r LongFormRow) -> &'r str {
        match self.spec.series_field {
            SeriesField::Scenario => &row.scenario,
            SeriesField::Metric => &row.metric,
        }
    }

    #[must_use]
    pub fn label_for<'s>(&'s self, key: &'s str) -> &'s str {
        legend_label(&self.legend, key)
    }

    /// Pivot rows into a threshold x series table, columns in legend order.
    #[must_use]
    pub fn pivot(&self) -> PivotTable {
        let thresholds: Vec<u64> = self
            .rows
            .iter()
            .map(|row| row.threshold)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = self
            .legend
            .iter()
            .filter(|entry| self.rows.iter().any(|row| self.series_key(row) == entry.key))
            .map(|entry| {
                let values = thresholds
                    .iter()
                    .map(|&threshold| {
                        self.rows
                            .iter()
                            .find(|row| row.threshold == threshold && self.series_key(row) == entry.key)
                            .map(|row| row.value)
                    })
                    .collect();
                (entry.label.clone(), values)
            })
            .collect();

        PivotTable {
            thresholds,
            columns,
        }
    }
}

/// One value per scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryChart {
    pub spec: ChartSpec,
    pub narrative: String,
    pub legend: Vec<LegendEntry>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryChart {
    #[must_use]
    pub fn label_for<'s>(&'s self, key: &'s str) -> &'s str {
        legend_label(&self.legend, key)
    }
}

fn legend_label<'s>(legend: &'s [LegendEntry], key: &'s str) -> &'s str {
    legend
        .iter()
        .find(|entry| entry.key == key)
        .map_or(key, |entry| entry.label.as_str())
}

/// Format `value` according to a `.Nf` spec; shortest round-trip form otherwise.
#[must_use]
pub fn format_value(value: f64, value_format: Option<&str>) -> String {
    let precision = value_format
        .and_then(|f| f.strip_prefix('.'))
        .and_then(|f| f.strip_suffix('f'))
        .and_then(|digits| digits.parse::<usize>().ok());
    match precision {
        Some(precision) => format!("{value:.precision$}"),
        None => value.to_string(),
    }
}
