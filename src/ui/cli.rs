// Command-line interface definitions and parsing for carbon-eda

use crate::config::{ApiTargetConfig, CategoryWeight, CliConfig};
use crate::core::constants::output_formats;
use crate::core::error::{CarbonEdaError, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // Dataset
    /// Number of records to synthesize (default: 240)
    #[arg(
        short = 'n',
        long,
        value_name = "COUNT",
        global = true,
        help_heading = "Dataset"
    )]
    pub records: Option<usize>,

    /// Seed for the dataset and clustering (default: 42)
    #[arg(long, value_name = "SEED", global = true, help_heading = "Dataset")]
    pub seed: Option<u64>,

    /// Categories to sample, as name or name=weight (comma-separated)
    #[arg(long, value_name = "LIST", global = true, help_heading = "Dataset")]
    pub categories: Option<String>,

    /// Emissions reduction for green hosting, 0-1 (default: 0.2)
    #[arg(long, value_name = "FRACTION", global = true, help_heading = "Dataset")]
    pub green_discount: Option<f64>,

    /// Half-width of the multiplicative noise band, 0-1 (default: 0.05)
    #[arg(long, value_name = "FRACTION", global = true, help_heading = "Dataset")]
    pub noise: Option<f64>,

    // Analysis
    /// Number of k-means clusters (default: 3)
    #[arg(long, value_name = "K", global = true, help_heading = "Analysis")]
    pub clusters: Option<usize>,

    /// Significance level (default: 0.05)
    #[arg(long, value_name = "ALPHA", global = true, help_heading = "Analysis")]
    pub alpha: Option<f64>,

    /// Histogram bins (default: 20)
    #[arg(long, value_name = "COUNT", global = true, help_heading = "Analysis")]
    pub bins: Option<usize>,

    // Sources
    /// Analyze a previously exported CSV table instead of synthesizing one
    #[arg(long, value_name = "CSV", global = true, help_heading = "Sources")]
    pub input: Option<String>,

    /// Base URL of the Website Carbon API
    #[arg(long, value_name = "URL", global = true, help_heading = "Sources")]
    pub api_url: Option<String>,

    /// Site to measure through the API, as URL=CATEGORY (repeatable)
    #[arg(long, value_name = "URL=CATEGORY", global = true, help_heading = "Sources")]
    pub api_target: Vec<String>,

    // Output & Verbosity
    /// Directory receiving every artifact (default: output)
    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        global = true,
        help_heading = "Output & Verbosity"
    )]
    pub output_dir: Option<String>,

    /// Skip the static SVG charts
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_static_charts: bool,

    /// Skip the interactive HTML charts
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_interactive: bool,

    /// Suppress progress output
    #[arg(short = 'q', long, global = true, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Output format (default: text)
    #[arg(long, value_name = "FORMAT", value_parser = output_formats::ALL, global = true, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    /// Disable progress spinners
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", global = true, help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, global = true, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Synthesize and export the dataset without analyzing it
    Generate,
}

/// Parse `blog=2,news` into category weights; a bare name weighs 1
pub fn parse_categories(list: &str) -> Result<Vec<CategoryWeight>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (name, weight) = match entry.split_once('=') {
                Some((name, weight)) => {
                    let weight: f64 = weight.trim().parse().map_err(|_| {
                        CarbonEdaError::InvalidArgument(format!(
                            "Weight '{}' for category '{}' is not a valid number.",
                            weight.trim(),
                            name.trim()
                        ))
                    })?;
                    (name.trim(), weight)
                }
                None => (entry, 1.0),
            };
            Ok(CategoryWeight {
                name: name.to_string(),
                weight,
            })
        })
        .collect()
}

/// Parse `https://example.com=blog`; the last `=` separates the category
pub fn parse_api_target(value: &str) -> Result<ApiTargetConfig> {
    match value.rsplit_once('=') {
        Some((url, category)) if !url.trim().is_empty() && !category.trim().is_empty() => {
            Ok(ApiTargetConfig {
                url: url.trim().to_string(),
                category: category.trim().to_string(),
            })
        }
        _ => Err(CarbonEdaError::InvalidArgument(format!(
            "API target '{value}' is invalid. Expected URL=CATEGORY."
        ))),
    }
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> Result<CliConfig> {
    let mut cli_config = CliConfig {
        record_count: cli.records,
        seed: cli.seed,
        green_discount: cli.green_discount,
        noise: cli.noise,
        clusters: cli.clusters,
        significance_level: cli.alpha,
        histogram_bins: cli.bins,
        ..CliConfig::default()
    };

    // Dataset
    if let Some(ref list) = cli.categories {
        cli_config.categories = Some(parse_categories(list)?);
    }

    // Sources
    cli_config.input_path = cli.input.clone();
    cli_config.api_base_url = cli.api_url.clone();
    if !cli.api_target.is_empty() {
        cli_config.api_targets = Some(
            cli.api_target
                .iter()
                .map(|t| parse_api_target(t))
                .collect::<Result<Vec<_>>>()?,
        );
    }

    // Output & format
    cli_config.output_dir = cli.output_dir.clone();
    cli_config.no_static_charts = cli.no_static_charts;
    cli_config.no_interactive = cli.no_interactive;
    cli_config.quiet = cli.quiet;
    cli_config.verbose = cli.verbose;
    cli_config.no_progress = cli.no_progress;
    cli_config.output_format = cli.format.clone();

    // Configuration
    cli_config.config_file = cli.config.clone();
    cli_config.no_config = cli.no_config;

    Ok(cli_config)
}
