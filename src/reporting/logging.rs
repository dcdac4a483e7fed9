//! Structured logging helpers for pipeline stages

use crate::config::Config;
use log::{debug, error, info, warn};
use std::path::Path;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn // Surface skipped tests and split warnings
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log the effective configuration
pub fn log_config_info(config: &Config) {
    let analysis = config.analysis_config();
    let report = config.report_config();

    info!(
        "Dataset: records={}, seed={}, green_discount={}, noise={}",
        config.record_count(),
        config.seed(),
        config.green_discount.unwrap_or_default(),
        config.noise.unwrap_or_default()
    );
    info!(
        "Analysis: clusters={}, alpha={}, max_iterations={}",
        analysis.clusters, analysis.significance_level, analysis.max_iterations
    );
    info!(
        "Output: dir={}, static_charts={}, interactive_charts={}, bins={}",
        report.output_dir.display(),
        report.static_charts,
        report.interactive_charts,
        report.histogram_bins
    );
}

/// Log the start of a pipeline stage
pub fn log_stage_start(stage: &str) {
    info!("Starting {stage}");
}

/// Log the completion of a pipeline stage
pub fn log_stage_complete(stage: &str, duration_ms: u128) {
    info!("✅ {stage} complete ({duration_ms}ms)");
}

/// Log a file written into the output directory
pub fn log_artifact(path: &Path) {
    debug!("Wrote {}", path.display());
}

/// Log a statistical procedure that could not run
pub fn log_skipped_test(name: &str, reason: &str) {
    warn!("Skipped {name}: {reason}");
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}
