//! Plain-text tables and Vega-Lite chart specs.
//!
//! Markdown lives on [`ThresholdReport::to_markdown`]; this module covers the terminal
//! view and the declarative specs a generic charting surface can draw unchanged.

use serde_json::{Value, json};

use crate::charts::{ChartKind, SeriesChart, SummaryChart, format_value};
use crate::report::ThresholdReport;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Fixed-width tables, one block per chart.
#[must_use]
pub fn render_plain(report: &ThresholdReport) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    writeln!(out, "{}", report.title).ok();
    writeln!(out, "generated {}", report.generated_at).ok();

    for chart in report.series_charts() {
        writeln!(out).ok();
        render_series_plain(&mut out, chart);
    }
    writeln!(out).ok();
    render_summary_plain(&mut out, &report.speedup);
    out
}

fn render_series_plain(out: &mut String, chart: &SeriesChart) {
    use std::fmt::Write as _;

    let w_threshold: usize = 10;
    let table = chart.pivot();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .map(|(label, _)| label.len().max(12))
        .collect();

    writeln!(out, "{} [{}]", chart.spec.title, chart.spec.y_label).ok();
    write!(out, "{:>w_threshold$}", "threshold").ok();
    for ((label, _), width) in table.columns.iter().zip(widths.iter().copied()) {
        write!(out, " {label:>width$}").ok();
    }
    writeln!(out).ok();
    let sep_len = w_threshold + widths.iter().map(|w| w + 1).sum::<usize>();
    writeln!(out, "{}", "-".repeat(sep_len)).ok();

    for (i, threshold) in table.thresholds.iter().enumerate() {
        write!(out, "{threshold:>w_threshold$}").ok();
        for ((_, values), width) in table.columns.iter().zip(widths.iter().copied()) {
            let cell = values[i].map_or_else(
                || "-".to_string(),
                |value| format_value(value, chart.spec.value_format.as_deref()),
            );
            write!(out, " {cell:>width$}").ok();
        }
        writeln!(out).ok();
    }
}

fn render_summary_plain(out: &mut String, chart: &SummaryChart) {
    use std::fmt::Write as _;

    let w_label = chart
        .rows
        .iter()
        .map(|row| chart.label_for(&row.scenario).len())
        .max()
        .unwrap_or(0)
        .max(chart.spec.x_label.len());
    let w_value = chart.spec.y_label.len();

    writeln!(out, "{}", chart.spec.title).ok();
    writeln!(
        out,
        "{:<w_label$} {:>w_value$}",
        chart.spec.x_label, chart.spec.y_label
    )
    .ok();
    writeln!(out, "{}", "-".repeat(w_label + 1 + w_value)).ok();
    for row in &chart.rows {
        writeln!(
            out,
            "{:<w_label$} {:>w_value$}",
            chart.label_for(&row.scenario),
            format_value(row.value, chart.spec.value_format.as_deref())
        )
        .ok();
    }
}

/// Vega-Lite spec for a threshold chart. Data rows carry a resolved `series` label.
#[must_use]
pub fn series_vega_lite(chart: &SeriesChart) -> Value {
    let spec = &chart.spec;
    let values: Vec<Value> = chart
        .rows
        .iter()
        .map(|row| {
            json!({
                "threshold": row.threshold,
                "scenario": row.scenario,
                "metric": row.metric,
                "series": chart.label_for(chart.series_key(row)),
                "value": row.value,
            })
        })
        .collect();
    let sort: Vec<&str> = chart.legend.iter().map(|entry| entry.label.as_str()).collect();

    let mark = match spec.kind {
        ChartKind::Line => json!({"type": "line", "point": spec.markers}),
        ChartKind::Bar => json!({"type": "bar"}),
    };
    let mut x = match spec.kind {
        ChartKind::Line => json!({"field": "threshold", "type": "quantitative", "title": spec.x_label}),
        ChartKind::Bar => json!({"field": "threshold", "type": "ordinal", "title": spec.x_label}),
    };
    if spec.log_x {
        x["scale"] = json!({"type": "log"});
    }
    let mut y = json!({"field": "value", "type": "quantitative", "title": spec.y_label});
    if spec.log_y {
        y["scale"] = json!({"type": "log"});
    }

    let mut encoding = json!({
        "x": x,
        "y": y,
        "color": {"field": "series", "type": "nominal", "title": spec.series_label, "sort": sort},
    });
    if spec.grouped {
        encoding["xOffset"] = json!({"field": "series", "sort": sort});
    }

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": spec.title,
        "description": chart.narrative,
        "data": {"values": values},
        "mark": mark,
        "encoding": encoding,
    })
}

/// Vega-Lite spec for the per-scenario summary: bars with value annotations.
#[must_use]
pub fn summary_vega_lite(chart: &SummaryChart) -> Value {
    let spec = &chart.spec;
    let values: Vec<Value> = chart
        .rows
        .iter()
        .map(|row| {
            json!({
                "scenario": row.scenario,
                "label": chart.label_for(&row.scenario),
                "value": row.value,
            })
        })
        .collect();
    let order: Vec<&str> = chart
        .rows
        .iter()
        .map(|row| chart.label_for(&row.scenario))
        .collect();

    let mut layers = vec![json!({"mark": {"type": "bar"}})];
    if let Some(format) = &spec.value_format {
        layers.push(json!({
            "mark": {"type": "text", "dy": -6},
            "encoding": {"text": {"field": "value", "type": "quantitative", "format": format}},
        }));
    }

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": spec.title,
        "description": chart.narrative,
        "data": {"values": values},
        "encoding": {
            "x": {"field": "label", "type": "nominal", "title": spec.x_label, "sort": order},
            "y": {"field": "value", "type": "quantitative", "title": spec.y_label},
        },
        "layer": layers,
    })
}

/// All four chart specs keyed by chart id, in report order.
#[must_use]
pub fn vega_lite_bundle(report: &ThresholdReport) -> Value {
    let mut charts = serde_json::Map::new();
    for chart in report.series_charts() {
        charts.insert(chart.spec.id.clone(), series_vega_lite(chart));
    }
    charts.insert(report.speedup.spec.id.clone(), summary_vega_lite(&report.speedup));
    json!({
        "title": report.title,
        "generated_at": report.generated_at,
        "charts": Value::Object(charts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::dataset::{EMBEDDED_DATASET, store_from_json};
    use crate::report::build_report;

    fn report() -> ThresholdReport {
        let store = store_from_json(EMBEDDED_DATASET).unwrap();
        let cfg = ReportConfig {
            timestamp: Some("fixed".to_string()),
            ..ReportConfig::default()
        };
        build_report(&store, &cfg).unwrap()
    }

    #[test]
    fn execution_time_spec_uses_log_axes_and_points() {
        let spec = series_vega_lite(&report().execution_time);
        assert_eq!(spec["mark"]["type"], "line");
        assert_eq!(spec["mark"]["point"], true);
        assert_eq!(spec["encoding"]["x"]["scale"]["type"], "log");
        assert_eq!(spec["encoding"]["y"]["scale"]["type"], "log");
        assert_eq!(spec["data"]["values"].as_array().unwrap().len(), 12);
        assert_eq!(spec["data"]["values"][0]["series"], "Small Range");
    }

    #[test]
    fn fragmentation_spec_is_linear_in_y() {
        let spec = series_vega_lite(&report().fragmentation);
        assert_eq!(spec["encoding"]["x"]["scale"]["type"], "log");
        assert!(spec["encoding"]["y"].get("scale").is_none());
    }

    #[test]
    fn memory_spec_groups_bars_by_type() {
        let spec = series_vega_lite(&report().memory);
        assert_eq!(spec["mark"]["type"], "bar");
        assert_eq!(spec["encoding"]["xOffset"]["field"], "series");
        assert_eq!(spec["data"]["values"][4]["series"], "Free Space");
    }

    #[test]
    fn summary_spec_annotates_values() {
        let spec = summary_vega_lite(&report().speedup);
        assert_eq!(spec["layer"][1]["encoding"]["text"]["format"], ".2f");
        assert_eq!(spec["data"]["values"][1]["label"], "Equal Size");
    }

    #[test]
    fn bundle_has_all_charts() {
        let bundle = vega_lite_bundle(&report());
        let charts = bundle["charts"].as_object().unwrap();
        let ids: Vec<&str> = charts.keys().map(String::as_str).collect();
        for id in ["execution_time", "fragmentation", "memory_usage", "speedup"] {
            assert!(ids.contains(&id), "missing {id}");
        }
    }

    #[test]
    fn plain_render_lists_speedups() {
        let plain = render_plain(&report());
        assert!(plain.contains("Performance Improvement Summary"));
        assert!(plain.lines().any(|l| l.starts_with("Small Range") && l.ends_with("3.99")));
        assert!(plain.contains("Memory Usage for Small Range [Memory Size (MB)]"));
    }
}
