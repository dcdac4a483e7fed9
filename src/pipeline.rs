//! Source -> analysis -> reporters
//!
//! The binary calls [`run`] for a full analysis or [`generate`] to only
//! produce and export the table. Both validate the configuration before
//! touching the output directory.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::analysis::analyze;
use crate::config::Config;
use crate::core::constants::defaults;
use crate::core::error::{CarbonEdaError, Result};
use crate::core::types::Dataset;
use crate::reporting::logging;
use crate::reporting::{
    InteractiveCharts, RunMetadata, Summary, export_dataset, render_static_charts, write_summary,
};
use crate::synthesis::hosting_split_within;
use crate::ui::ProgressReporter;

/// What a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub metadata: RunMetadata,
    /// Absent for `generate`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    pub output_dir: PathBuf,
    pub artifacts: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Time a stage, with a spinner and a log line around it
fn stage<T>(
    progress: &mut ProgressReporter,
    name: &str,
    work: impl FnOnce() -> Result<T>,
) -> Result<T> {
    logging::log_stage_start(name);
    progress.start_stage(name);
    let started = Instant::now();
    let value = work()?;
    progress.finish_stage(name);
    logging::log_stage_complete(name, started.elapsed().as_millis());
    Ok(value)
}

fn record_artifacts(artifacts: &mut Vec<PathBuf>, written: Vec<PathBuf>) {
    for path in &written {
        logging::log_artifact(path);
    }
    artifacts.extend(written);
}

/// Read the records from the configured source and check the hosting split
async fn collect_records(
    config: &Config,
    progress: &mut ProgressReporter,
) -> Result<(Dataset, String, Vec<String>)> {
    let source = config.source_kind()?.into_source()?;
    let description = source.describe();

    logging::log_stage_start("record collection");
    progress.start_stage(&format!("Collecting records from {description}"));
    let started = Instant::now();
    let dataset = source.collect().await?;
    progress.finish_stage(&format!("Collected {} records", dataset.len()));
    logging::log_stage_complete("record collection", started.elapsed().as_millis());

    if dataset.is_empty() {
        return Err(CarbonEdaError::Validation(format!(
            "The record source '{description}' produced no records."
        )));
    }

    let mut warnings = Vec::new();
    let tolerance = config.split_tolerance.unwrap_or(defaults::SPLIT_TOLERANCE);
    if !hosting_split_within(&dataset, tolerance) {
        let warning = format!(
            "Green share {:.2} is outside 0.50 ± {tolerance:.2}; group comparisons may be unbalanced",
            dataset.green_share()
        );
        logging::log_warning(&warning);
        warnings.push(warning);
    }

    Ok((dataset, description, warnings))
}

/// Produce and export the table only
pub async fn generate(config: &Config, progress: &mut ProgressReporter) -> Result<RunOutcome> {
    config.validate()?;
    let report_config = config.report_config();

    let (dataset, source, warnings) = collect_records(config, progress).await?;
    report_config.ensure_output_dir()?;

    let mut artifacts = Vec::new();
    let written = stage(progress, "dataset export", || {
        export_dataset(&dataset, &report_config.output_dir)
    })?;
    record_artifacts(&mut artifacts, written);
    progress.finish_and_clear();

    Ok(RunOutcome {
        metadata: RunMetadata::new(config.seed(), dataset.len(), source),
        summary: None,
        output_dir: report_config.output_dir,
        artifacts,
        warnings,
    })
}

/// The full pipeline: collect, export, analyze, chart and summarize
pub async fn run(config: &Config, progress: &mut ProgressReporter) -> Result<RunOutcome> {
    config.validate()?;
    let report_config = config.report_config();
    let analysis_config = config.analysis_config();
    let output_dir = report_config.output_dir.clone();

    let (dataset, source, warnings) = collect_records(config, progress).await?;
    report_config.ensure_output_dir()?;

    let mut artifacts = Vec::new();
    let written = stage(progress, "dataset export", || {
        export_dataset(&dataset, &output_dir)
    })?;
    record_artifacts(&mut artifacts, written);

    let report = stage(progress, "analysis", || {
        Ok(analyze(&dataset, &analysis_config))
    })?;
    for (name, reason) in report.skipped_tests() {
        logging::log_skipped_test(name, reason);
    }

    if report_config.static_charts {
        let written = stage(progress, "static charts", || {
            render_static_charts(&dataset, &report, &output_dir, report_config.histogram_bins)
        })?;
        record_artifacts(&mut artifacts, written);
    }

    if report_config.interactive_charts {
        let written = stage(progress, "interactive charts", || {
            InteractiveCharts::write_all(&dataset, &report, &output_dir, report_config.histogram_bins)
        })?;
        record_artifacts(&mut artifacts, written);
    }

    let metadata = RunMetadata::new(config.seed(), dataset.len(), source);
    let summary = Summary::new(metadata.clone(), &dataset, report);
    let written = stage(progress, "summary", || write_summary(&summary, &output_dir))?;
    record_artifacts(&mut artifacts, vec![written]);
    progress.finish_and_clear();

    Ok(RunOutcome {
        metadata,
        summary: Some(summary),
        output_dir,
        artifacts,
        warnings,
    })
}
