//! Statistical analysis
//!
//! This module turns a dataset into an [`AnalysisReport`]: descriptive
//! statistics, green vs non-green comparisons, correlation, the rating x
//! hosting cross-tabulation and k-means segmentation. Every test whose
//! preconditions fail is reported as [`TestOutcome::NotApplicable`] rather
//! than as an error.

pub mod clustering;
pub mod correlation;
pub mod crosstab;
pub mod descriptive;
pub mod distributions;
pub mod hypothesis;

use serde::Serialize;

use crate::core::constants::defaults;
use crate::core::types::Dataset;

// Re-export commonly used items
pub use clustering::{Centroid, KMeansModel, fit_kmeans};
pub use correlation::{
    CorrelationMatrix, PearsonCorrelation, TrendLine, correlation_matrix, linear_fit, pearson,
};
pub use crosstab::{ChiSquareTest, CrossTab, CrossTabRow, crosstab};
pub use descriptive::{DescriptiveStats, GroupStats, describe};
pub use hypothesis::{
    MannWhitneyTest, WelchTTest, effect_size_interpretation, mann_whitney_u, significance_stars,
    welch_t_test,
};

/// Parameters of the analysis stage
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub clusters: usize,
    pub significance_level: f64,
    /// Seed of the k-means++ initialisation
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            clusters: defaults::CLUSTERS,
            significance_level: defaults::SIGNIFICANCE_LEVEL,
            seed: defaults::SEED,
            max_iterations: defaults::KMEANS_MAX_ITERATIONS,
        }
    }
}

/// Result of a statistical procedure whose preconditions may not hold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome<T> {
    Completed(T),
    NotApplicable { reason: String },
}

impl<T> TestOutcome<T> {
    pub fn not_applicable(reason: impl Into<String>) -> Self {
        TestOutcome::NotApplicable {
            reason: reason.into(),
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            TestOutcome::Completed(value) => Some(value),
            TestOutcome::NotApplicable { .. } => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, TestOutcome::Completed(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            TestOutcome::Completed(_) => None,
            TestOutcome::NotApplicable { reason } => Some(reason),
        }
    }
}

/// Everything the analyzer computes for one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub record_count: usize,
    pub significance_level: f64,
    pub descriptive: DescriptiveStats,
    pub welch_t_test: TestOutcome<WelchTTest>,
    pub mann_whitney: TestOutcome<MannWhitneyTest>,
    /// Page size vs emissions
    pub correlation: TestOutcome<PearsonCorrelation>,
    pub trend_line: Option<TrendLine>,
    pub correlation_matrix: CorrelationMatrix,
    pub crosstab: CrossTab,
    pub clustering: TestOutcome<KMeansModel>,
}

impl AnalysisReport {
    /// Name and skip reason of every procedure that could not run
    pub fn skipped_tests(&self) -> Vec<(&'static str, &str)> {
        [
            ("welch t-test", self.welch_t_test.reason()),
            ("mann-whitney u", self.mann_whitney.reason()),
            ("pearson correlation", self.correlation.reason()),
            ("chi-square", self.crosstab.chi_square.reason()),
            ("k-means", self.clustering.reason()),
        ]
        .into_iter()
        .filter_map(|(name, reason)| reason.map(|r| (name, r)))
        .collect()
    }
}

/// Run every procedure over the dataset
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> AnalysisReport {
    let alpha = config.significance_level;
    let green = dataset.emissions_by_hosting(true);
    let non_green = dataset.emissions_by_hosting(false);

    let sizes: Vec<f64> = dataset.records().iter().map(|r| r.size_bytes as f64).collect();
    let sizes_mb: Vec<f64> = dataset.records().iter().map(|r| r.size_mb()).collect();
    let emissions = dataset.emissions();

    AnalysisReport {
        record_count: dataset.len(),
        significance_level: alpha,
        descriptive: describe(dataset),
        welch_t_test: welch_t_test(&green, &non_green, alpha),
        mann_whitney: mann_whitney_u(&green, &non_green, alpha),
        correlation: pearson(&sizes, &emissions, alpha),
        trend_line: linear_fit(&sizes_mb, &emissions),
        correlation_matrix: correlation_matrix(dataset),
        crosstab: crosstab(dataset, alpha),
        clustering: fit_kmeans(dataset, config.clusters, config.seed, config.max_iterations),
    }
}
