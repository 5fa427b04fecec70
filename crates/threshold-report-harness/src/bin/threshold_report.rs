//! CLI entrypoint for allocator threshold reports.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use threshold_report_core::{Metric, MetricDeriver, SeriesComposer};
use threshold_report_harness::render::{render_plain, vega_lite_bundle};
use threshold_report_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, Stage,
};
use threshold_report_harness::{ReportConfig, build_report, load_store_or_embedded};

/// Report tooling for allocator size-class threshold sweeps.
#[derive(Debug, Parser)]
#[command(name = "threshold-report")]
#[command(about = "Aggregate allocator threshold benchmarks into chart-ready reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
    Plain,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the full report (three threshold charts + speedup summary).
    Render {
        /// Dataset JSON path (defaults to the embedded sweep).
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Output markdown path; JSON, Vega-Lite and artifact index files are written beside it.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Stdout format when `--output` is omitted.
        #[arg(long, value_enum, default_value = "markdown")]
        format: Format,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
        /// Divisor applied to byte counts in the memory chart.
        #[arg(long, default_value_t = threshold_report_core::MEGABYTE)]
        unit_divisor: f64,
        /// Unit name for the memory chart axis.
        #[arg(long, default_value = "MB")]
        unit_label: String,
        /// Scenario whose segment bytes feed the memory chart.
        #[arg(long, default_value = "small_alloc")]
        memory_scenario: String,
        /// Restrict timing/fragmentation/speedup charts to these scenarios (repeatable).
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
    },
    /// Validate a dataset without rendering anything.
    Validate {
        /// Dataset JSON path (defaults to the embedded sweep).
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Print long-form rows for one metric as JSON.
    Compose {
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Metric name (`execution_time`, `fragmentation_ratio`, `data_segment_bytes`,
        /// `free_space_bytes`). A name no scenario reports prints an empty list.
        #[arg(long)]
        metric: String,
        /// Scenarios to include (repeatable; defaults to all).
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
        /// Divide byte-count values by this factor.
        #[arg(long)]
        unit_divisor: Option<f64>,
    },
    /// Print the per-scenario speedup summary as JSON.
    Speedup {
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
    },
}

/// Optional JSONL log for one CLI run.
struct RunLog {
    emitter: Option<LogEmitter>,
}

impl RunLog {
    fn open(path: Option<&Path>, run_kind: &str) -> std::io::Result<Self> {
        let run_id = format!("run-{}", std::process::id());
        let emitter = path
            .map(|path| LogEmitter::to_file(path, run_kind, &run_id))
            .transpose()?;
        Ok(Self { emitter })
    }

    fn record(&mut self, entry: LogEntry) -> std::io::Result<()> {
        match &mut self.emitter {
            Some(emitter) => emitter.emit_entry(entry),
            None => Ok(()),
        }
    }

    /// Record `result`'s error as a fail event, flush, and hand `result` back.
    fn finish(
        &mut self,
        failure_event: &str,
        stage: Stage,
        result: Result<(), Box<dyn std::error::Error>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Err(err) = &result {
            self.record(
                stage_entry(LogLevel::Error, failure_event, stage)
                    .with_outcome(Outcome::Fail)
                    .with_details(serde_json::json!({ "error": err.to_string() })),
            )?;
        }
        if let Some(emitter) = &mut self.emitter {
            emitter.flush()?;
        }
        result
    }
}

fn stage_entry(level: LogLevel, event: &str, stage: Stage) -> LogEntry {
    LogEntry::new("", level, event).with_stage(stage)
}

fn write_file(path: &Path, body: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Stage every artifact under a `.tmp` name, then rename them into place in order.
/// A failed staging write removes what was staged and leaves earlier outputs alone.
fn write_artifacts(artifacts: &[(&Path, &str)]) -> std::io::Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for (path, body) in artifacts {
        let tmp = staging_path(path);
        if let Err(err) = write_file(&tmp, body) {
            for tmp in &staged {
                std::fs::remove_file(tmp).ok();
            }
            return Err(err);
        }
        staged.push(tmp);
    }
    for (tmp, (path, _)) in staged.iter().zip(artifacts) {
        std::fs::rename(tmp, path)?;
    }
    Ok(())
}

fn scenario_selection(scenarios: Vec<String>) -> Option<Vec<String>> {
    (!scenarios.is_empty()).then_some(scenarios)
}

fn run_render(
    dataset: Option<&Path>,
    output: Option<&Path>,
    format: Format,
    log: &mut RunLog,
    cfg: &ReportConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let store = load_store_or_embedded(dataset)?;
    log.record(
        stage_entry(LogLevel::Info, "dataset_loaded", Stage::Load)
            .with_rows(store.scenarios().len())
            .with_outcome(Outcome::Pass),
    )?;

    let report = build_report(&store, cfg)?;
    for chart in report.series_charts() {
        log.record(
            stage_entry(LogLevel::Info, "chart_composed", Stage::Compose)
                .with_metric(chart.spec.id.clone())
                .with_rows(chart.rows.len()),
        )?;
    }
    log.record(
        stage_entry(LogLevel::Info, "chart_composed", Stage::Compose)
            .with_metric(report.speedup.spec.id.clone())
            .with_rows(report.speedup.rows.len()),
    )?;

    let markdown = report.to_markdown();
    let json = report.to_json()?;
    let vega = serde_json::to_string_pretty(&vega_lite_bundle(&report))?;
    log.record(
        stage_entry(LogLevel::Info, "report_rendered", Stage::Render).with_rows(report.row_count()),
    )?;

    let Some(md_path) = output else {
        let body = match format {
            Format::Markdown => markdown,
            Format::Json => json,
            Format::Plain => render_plain(&report),
        };
        print!("{body}");
        return Ok(());
    };

    let json_path = md_path.with_extension("json");
    let vega_path = md_path.with_extension("vl.json");
    let index_path = md_path.with_extension("artifacts.json");

    let mut index = ArtifactIndex::new(format!("render-{}", std::process::id()));
    for (path, kind, body) in [
        (md_path, "markdown", &markdown),
        (json_path.as_path(), "report_json", &json),
        (vega_path.as_path(), "vega_lite", &vega),
    ] {
        index.add_content(path.display().to_string(), kind, body.as_bytes());
    }
    let index_json = index.to_json()?;
    // Index last: its presence means every artifact it lists is in place.
    write_artifacts(&[
        (md_path, markdown.as_str()),
        (json_path.as_path(), json.as_str()),
        (vega_path.as_path(), vega.as_str()),
        (index_path.as_path(), index_json.as_str()),
    ])?;

    let written: Vec<String> = index.artifacts.iter().map(|a| a.path.clone()).collect();
    log.record(
        stage_entry(LogLevel::Info, "artifacts_written", Stage::Write)
            .with_artifacts(written)
            .with_outcome(Outcome::Pass)
            .with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
    )?;

    eprintln!(
        "Wrote threshold report to {} ({} rows, index {})",
        md_path.display(),
        report.row_count(),
        index_path.display()
    );
    Ok(())
}

fn run_validate(dataset: Option<&Path>, log: &mut RunLog) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store_or_embedded(dataset)?;
    log.record(
        stage_entry(LogLevel::Info, "dataset_loaded", Stage::Load).with_rows(store.scenarios().len()),
    )?;
    for scenario in store.scenarios() {
        let metrics: Vec<&str> = scenario.metrics().into_iter().map(Metric::as_str).collect();
        log.record(
            stage_entry(LogLevel::Info, "scenario_validated", Stage::Validate)
                .with_scenario(scenario.name())
                .with_rows(scenario.samples().len())
                .with_outcome(Outcome::Pass)
                .with_details(serde_json::json!({ "metrics": metrics })),
        )?;
    }

    let samples: usize = store
        .scenarios()
        .iter()
        .map(|s| s.samples().len())
        .sum();
    eprintln!(
        "Dataset OK: '{}', {} thresholds, {} scenarios, {} samples",
        store.title(),
        store.thresholds().len(),
        store.scenarios().len(),
        samples
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            dataset,
            output,
            format,
            log,
            timestamp,
            unit_divisor,
            unit_label,
            memory_scenario,
            scenarios,
        } => {
            let cfg = ReportConfig {
                unit_divisor,
                unit_label,
                scenarios: scenario_selection(scenarios),
                memory_scenario,
                timestamp,
            };
            let mut run_log = RunLog::open(log.as_deref(), "render")?;
            let result = run_render(
                dataset.as_deref(),
                output.as_deref(),
                format,
                &mut run_log,
                &cfg,
            );
            run_log.finish("report_failed", Stage::Render, result)?;
        }
        Command::Validate { dataset, log } => {
            let mut run_log = RunLog::open(log.as_deref(), "validate")?;
            let result = run_validate(dataset.as_deref(), &mut run_log);
            run_log.finish("validation_failed", Stage::Validate, result)?;
        }
        Command::Compose {
            dataset,
            metric,
            scenarios,
            unit_divisor,
        } => {
            let store = load_store_or_embedded(dataset.as_deref())?;
            let names = match scenario_selection(scenarios) {
                Some(names) => names,
                None => store.scenario_names().into_iter().map(str::to_string).collect(),
            };
            let composer = SeriesComposer::new(&store);
            let rows = match (Metric::from_str_loose(&metric), unit_divisor) {
                (Some(known), Some(divisor)) => composer.compose_scaled(known, &names, divisor)?,
                _ => composer.compose_by_name(&metric, &names)?,
            };
            if rows.is_empty() {
                eprintln!("No selected scenario reports metric '{metric}'");
            }
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Speedup { dataset, scenarios } => {
            let store = load_store_or_embedded(dataset.as_deref())?;
            let names = match scenario_selection(scenarios) {
                Some(names) => names,
                None => store.scenario_names().into_iter().map(str::to_string).collect(),
            };
            let deriver = MetricDeriver::new(&store);
            let rows = SeriesComposer::new(&store)
                .compose_summary(&names, |name| deriver.speedup(name))?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
