//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::AnalysisConfig;
use crate::core::constants::{defaults, emissions, limits, output_formats};
use crate::core::error::{CarbonEdaError, Result};
use crate::core::types::Category;
use crate::reporting::ReportConfig;
use crate::synthesis::{ApiTarget, SourceKind, SynthesisConfig};

/// Relative sampling weight of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub name: String,
    pub weight: f64,
}

/// A site to query when the live Website Carbon source is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTargetConfig {
    pub url: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of records to synthesize
    pub record_count: Option<usize>,

    /// Seed for the dataset and the clustering initialisation
    pub seed: Option<u64>,

    /// Directory receiving every artifact
    pub output_dir: Option<String>,

    /// Categories to sample and their weights
    pub categories: Option<Vec<CategoryWeight>>,

    /// Fractional emissions reduction for green hosting (0-1)
    pub green_discount: Option<f64>,

    /// Half-width of the multiplicative noise band (0-1)
    pub noise: Option<f64>,

    /// Accepted deviation of the green share from 50%
    pub split_tolerance: Option<f64>,

    /// Number of k-means clusters
    pub clusters: Option<usize>,

    /// Significance level used to flag test results
    pub significance_level: Option<f64>,

    /// Number of histogram bins in the charts
    pub histogram_bins: Option<usize>,

    /// Upper bound on k-means iterations
    pub max_iterations: Option<usize>,

    /// Render the static SVG charts
    pub static_charts: Option<bool>,

    /// Render the interactive HTML charts
    pub interactive_charts: Option<bool>,

    /// Output format (text, json, minimal)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,

    /// Analyze an existing CSV table instead of synthesizing one
    pub input_path: Option<String>,

    /// Base URL of the Website Carbon API
    pub api_base_url: Option<String>,

    /// Sites to query through the Website Carbon API
    pub api_targets: Option<Vec<ApiTargetConfig>>,

    /// Timeout in seconds for API requests
    pub api_timeout: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_count: Some(defaults::RECORD_COUNT),
            seed: Some(defaults::SEED),
            output_dir: Some(defaults::OUTPUT_DIR.to_string()),
            categories: None, // All categories with the default weights
            green_discount: Some(emissions::DEFAULT_GREEN_DISCOUNT),
            noise: Some(emissions::DEFAULT_NOISE),
            split_tolerance: Some(defaults::SPLIT_TOLERANCE),
            clusters: Some(defaults::CLUSTERS),
            significance_level: Some(defaults::SIGNIFICANCE_LEVEL),
            histogram_bins: Some(defaults::HISTOGRAM_BINS),
            max_iterations: Some(defaults::KMEANS_MAX_ITERATIONS),
            static_charts: Some(true),
            interactive_charts: Some(true),
            output_format: Some(output_formats::DEFAULT.to_string()),
            verbose: Some(false),
            input_path: None,
            api_base_url: None,
            api_targets: None,
            api_timeout: Some(defaults::API_TIMEOUT_SECONDS),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CarbonEdaError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CarbonEdaError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        // Validate the loaded configuration
        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations.
    ///
    /// Locations without a file are skipped; a file that exists but cannot
    /// be read, parsed or validated is an error.
    pub fn load_from_standard_locations() -> Result<Self> {
        // Current directory, then up to 3 parent directories
        for i in 0..=3 {
            let path = PathBuf::from(format!(
                "{}{}",
                "../".repeat(i),
                defaults::CONFIG_FILE_NAME
            ));
            if path.is_file() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Dataset
        if let Some(record_count) = cli_config.record_count {
            self.record_count = Some(record_count);
        }
        if let Some(seed) = cli_config.seed {
            self.seed = Some(seed);
        }
        if let Some(ref categories) = cli_config.categories {
            self.categories = Some(categories.clone());
        }
        if let Some(discount) = cli_config.green_discount {
            self.green_discount = Some(discount);
        }
        if let Some(noise) = cli_config.noise {
            self.noise = Some(noise);
        }

        // Analysis
        if let Some(clusters) = cli_config.clusters {
            self.clusters = Some(clusters);
        }
        if let Some(alpha) = cli_config.significance_level {
            self.significance_level = Some(alpha);
        }
        if let Some(bins) = cli_config.histogram_bins {
            self.histogram_bins = Some(bins);
        }

        // Sources
        if let Some(ref input) = cli_config.input_path {
            self.input_path = Some(input.clone());
        }
        if let Some(ref base_url) = cli_config.api_base_url {
            self.api_base_url = Some(base_url.clone());
        }
        if let Some(ref targets) = cli_config.api_targets {
            self.api_targets = Some(targets.clone());
        }

        // Output & format
        if let Some(ref output_dir) = cli_config.output_dir {
            self.output_dir = Some(output_dir.clone());
        }
        if cli_config.no_static_charts {
            self.static_charts = Some(false);
        }
        if cli_config.no_interactive {
            self.interactive_charts = Some(false);
        }
        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
    }

    pub fn record_count(&self) -> usize {
        self.record_count.unwrap_or(defaults::RECORD_COUNT)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(defaults::SEED)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or(defaults::OUTPUT_DIR))
    }

    pub fn output_format(&self) -> &str {
        self.output_format.as_deref().unwrap_or(output_formats::DEFAULT)
    }

    /// Get the API timeout as Duration
    pub fn api_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.api_timeout.unwrap_or(defaults::API_TIMEOUT_SECONDS))
    }

    /// Resolve the configured categories, or all categories with default weights
    pub fn category_weights(&self) -> Result<Vec<(Category, f64)>> {
        let Some(ref categories) = self.categories else {
            return Ok(Category::ALL
                .into_iter()
                .zip(defaults::CATEGORY_WEIGHTS)
                .collect());
        };

        if categories.is_empty() {
            return Err(CarbonEdaError::Config(
                "Category list cannot be empty. Expected at least one category.".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut weights = Vec::with_capacity(categories.len());
        for entry in categories {
            let category: Category = entry.name.parse()?;
            if !seen.insert(category) {
                return Err(CarbonEdaError::Config(format!(
                    "Category '{category}' is listed more than once."
                )));
            }
            if !(entry.weight.is_finite() && entry.weight > 0.0) {
                return Err(CarbonEdaError::Config(format!(
                    "Weight {} for category '{category}' is invalid. Expected a positive number.",
                    entry.weight
                )));
            }
            weights.push((category, entry.weight));
        }
        Ok(weights)
    }

    pub fn synthesis_config(&self) -> Result<SynthesisConfig> {
        Ok(SynthesisConfig {
            record_count: self.record_count(),
            seed: self.seed(),
            categories: self.category_weights()?,
            green_discount: self.green_discount.unwrap_or(emissions::DEFAULT_GREEN_DISCOUNT),
            noise: self.noise.unwrap_or(emissions::DEFAULT_NOISE),
        })
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            clusters: self.clusters.unwrap_or(defaults::CLUSTERS),
            significance_level: self
                .significance_level
                .unwrap_or(defaults::SIGNIFICANCE_LEVEL),
            seed: self.seed(),
            max_iterations: self
                .max_iterations
                .unwrap_or(defaults::KMEANS_MAX_ITERATIONS),
        }
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            output_dir: self.output_dir(),
            static_charts: self.static_charts.unwrap_or(true),
            interactive_charts: self.interactive_charts.unwrap_or(true),
            histogram_bins: self.histogram_bins.unwrap_or(defaults::HISTOGRAM_BINS),
        }
    }

    /// Decide which record source feeds the pipeline
    pub fn source_kind(&self) -> Result<SourceKind> {
        if let Some(ref input) = self.input_path {
            return Ok(SourceKind::Csv(PathBuf::from(input)));
        }

        if let Some(ref targets) = self.api_targets {
            let targets = targets
                .iter()
                .map(|t| {
                    Ok(ApiTarget {
                        url: t.url.trim().to_string(),
                        category: t.category.parse()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(SourceKind::Api {
                base_url: self
                    .api_base_url
                    .clone()
                    .unwrap_or_else(|| defaults::API_BASE_URL.to_string()),
                targets,
                timeout: self.api_timeout_duration(),
            });
        }

        Ok(SourceKind::Synthetic(self.synthesis_config()?))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate record count
        if let Some(count) = self.record_count {
            if count == 0 {
                return Err(CarbonEdaError::Config(
                    "Record count cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if count > limits::MAX_RECORD_COUNT {
                return Err(CarbonEdaError::Config(format!(
                    "Record count of {count} is above the limit of {}.",
                    limits::MAX_RECORD_COUNT
                )));
            }
        }

        self.category_weights()?;

        // Validate the generative model parameters
        let discount = self.green_discount.unwrap_or(emissions::DEFAULT_GREEN_DISCOUNT);
        if !(discount > 0.0 && discount < 1.0) {
            return Err(CarbonEdaError::Config(format!(
                "Green discount {discount} is invalid. Expected a value between 0 and 1 (exclusive)."
            )));
        }
        let noise = self.noise.unwrap_or(emissions::DEFAULT_NOISE);
        if !(0.0..1.0).contains(&noise) {
            return Err(CarbonEdaError::Config(format!(
                "Noise {noise} is invalid. Expected a value in [0, 1)."
            )));
        }
        if (1.0 - noise) <= (1.0 - discount) * (1.0 + noise) {
            return Err(CarbonEdaError::Config(format!(
                "Noise {noise} is too large for a green discount of {discount}: green sites could out-emit non-green ones."
            )));
        }

        if let Some(tolerance) = self.split_tolerance
            && !(0.0..=0.5).contains(&tolerance)
        {
            return Err(CarbonEdaError::Config(format!(
                "Split tolerance {tolerance} is invalid. Expected a value between 0 and 0.5."
            )));
        }

        // Validate analysis parameters
        if let Some(clusters) = self.clusters
            && !(1..=limits::MAX_CLUSTERS).contains(&clusters)
        {
            return Err(CarbonEdaError::Config(format!(
                "Cluster count {clusters} is invalid. Expected a value between 1-{}.",
                limits::MAX_CLUSTERS
            )));
        }
        if let Some(alpha) = self.significance_level
            && !(alpha > 0.0 && alpha < 1.0)
        {
            return Err(CarbonEdaError::Config(format!(
                "Significance level {alpha} is invalid. Expected a value between 0 and 1 (exclusive)."
            )));
        }
        if let Some(bins) = self.histogram_bins
            && !(1..=limits::MAX_HISTOGRAM_BINS).contains(&bins)
        {
            return Err(CarbonEdaError::Config(format!(
                "Histogram bin count {bins} is invalid. Expected a value between 1-{}.",
                limits::MAX_HISTOGRAM_BINS
            )));
        }
        if let Some(0) = self.max_iterations {
            return Err(CarbonEdaError::Config(
                "Maximum iterations cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        // Validate output format
        if let Some(ref format) = self.output_format {
            match format.as_str() {
                f if output_formats::ALL.contains(&f) => {}
                _ => {
                    return Err(CarbonEdaError::Config(format!(
                        "Invalid output format '{format}'. Expected one of: {}.",
                        output_formats::ALL.join(", ")
                    )));
                }
            }
        }

        // Validate output directory
        if let Some(ref dir) = self.output_dir {
            if dir.trim().is_empty() {
                return Err(CarbonEdaError::Config(
                    "Output directory cannot be empty.".to_string(),
                ));
            }
            let path = Path::new(dir);
            if path.exists() && !path.is_dir() {
                return Err(CarbonEdaError::Config(format!(
                    "Output path '{dir}' exists and is not a directory."
                )));
            }
        }

        // Validate sources
        if self.input_path.is_some() && self.api_targets.is_some() {
            return Err(CarbonEdaError::Config(
                "An input file and API targets cannot be combined. Pick one record source."
                    .to_string(),
            ));
        }
        if let Some(ref targets) = self.api_targets {
            if targets.is_empty() {
                return Err(CarbonEdaError::Config(
                    "API target list cannot be empty.".to_string(),
                ));
            }
            for target in targets {
                if target.url.trim().is_empty() {
                    return Err(CarbonEdaError::Config(
                        "API target URL cannot be empty.".to_string(),
                    ));
                }
                target.category.parse::<Category>()?;
            }
        }
        if let Some(0) = self.api_timeout {
            return Err(CarbonEdaError::Config(
                "API timeout cannot be 0. Expected a positive integer representing seconds."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Dataset
    pub record_count: Option<usize>,               // --records
    pub seed: Option<u64>,                         // --seed
    pub categories: Option<Vec<CategoryWeight>>,   // --categories
    pub green_discount: Option<f64>,               // --green-discount
    pub noise: Option<f64>,                        // --noise

    // Analysis
    pub clusters: Option<usize>,                   // --clusters
    pub significance_level: Option<f64>,           // --alpha
    pub histogram_bins: Option<usize>,             // --bins

    // Sources
    pub input_path: Option<String>,                // --input
    pub api_base_url: Option<String>,              // --api-url
    pub api_targets: Option<Vec<ApiTargetConfig>>, // --api-target

    // Output & format
    pub output_dir: Option<String>,    // --output-dir
    pub no_static_charts: bool,        // --no-static-charts
    pub no_interactive: bool,          // --no-interactive
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub output_format: Option<String>, // --format
    pub no_progress: bool,             // --no-progress

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
