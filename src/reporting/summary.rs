//! The machine readable summary of a run
//!
//! `summary.json` carries the run metadata, a list of plain-language
//! findings, the cluster of every record and the complete analysis report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisReport, effect_size_interpretation, significance_stars};
use crate::core::constants::{artifacts, emissions};
use crate::core::error::Result;
use crate::core::types::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub record_count: usize,
    /// Description of the record source
    pub source: String,
}

impl RunMetadata {
    pub fn new(seed: u64, record_count: usize, source: impl Into<String>) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now(),
            seed,
            record_count,
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterAssignment {
    pub url: String,
    pub cluster: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub metadata: RunMetadata,
    pub findings: Vec<String>,
    /// Empty when clustering did not run
    pub cluster_assignments: Vec<ClusterAssignment>,
    pub analysis: AnalysisReport,
}

impl Summary {
    pub fn new(metadata: RunMetadata, dataset: &Dataset, analysis: AnalysisReport) -> Self {
        let cluster_assignments = analysis
            .clustering
            .completed()
            .map(|model| {
                dataset
                    .records()
                    .iter()
                    .zip(&model.labels)
                    .map(|(record, &cluster)| ClusterAssignment {
                        url: record.url.clone(),
                        cluster,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            metadata,
            findings: findings(&analysis),
            cluster_assignments,
            analysis,
        }
    }
}

fn verdict(significant: bool) -> &'static str {
    if significant {
        "significant"
    } else {
        "not significant"
    }
}

/// Plain-language statements about the report, most important first
pub fn findings(report: &AnalysisReport) -> Vec<String> {
    let mut findings = Vec::new();
    let alpha = report.significance_level;
    let descriptive = &report.descriptive;

    if let (Some(savings), Some(green), Some(non_green)) = (
        descriptive.green_savings_pct,
        descriptive.hosting(true),
        descriptive.hosting(false),
    ) {
        findings.push(format!(
            "Green-hosted sites emit {savings:.1}% less CO2e per page view on average ({:.3} g vs {:.3} g)",
            green.mean, non_green.mean
        ));
    }

    if let Some(t) = report.welch_t_test.completed() {
        findings.push(format!(
            "Welch t-test: t = {:.2}, df = {:.1}, p = {:.4}{}, Cohen's d = {:.2} ({} effect); {} at alpha = {alpha}",
            t.t_statistic,
            t.degrees_of_freedom,
            t.p_value,
            significance_stars(t.p_value),
            t.cohens_d,
            effect_size_interpretation(t.cohens_d),
            verdict(t.significant)
        ));
    }

    if let Some(u) = report.mann_whitney.completed() {
        findings.push(format!(
            "Mann-Whitney U = {:.1}, p = {:.4}{}, rank-biserial r = {:.2}; {}",
            u.u_statistic,
            u.p_value,
            significance_stars(u.p_value),
            u.rank_biserial,
            verdict(u.significant)
        ));
    }

    if let Some(c) = report.correlation.completed() {
        findings.push(format!(
            "Page size and emissions: Pearson r = {:.3} (n = {}), p = {:.4}{}; {}",
            c.r,
            c.n,
            c.p_value,
            significance_stars(c.p_value),
            verdict(c.significant)
        ));
    }
    if let Some(line) = report.trend_line {
        findings.push(format!(
            "Each additional MB of page weight adds about {:.3} gCO2e per page view",
            line.slope
        ));
    }

    if let Some(chi) = report.crosstab.chi_square.completed() {
        let relation = if chi.significant {
            "are associated"
        } else {
            "show no detectable association"
        };
        findings.push(format!(
            "Rating and hosting type {relation}: chi-square = {:.2}, df = {}, p = {:.4}{}, Cramer's V = {:.2}",
            chi.statistic,
            chi.degrees_of_freedom,
            chi.p_value,
            significance_stars(chi.p_value),
            chi.cramers_v
        ));
        if chi.low_expected_cells > 0 {
            findings.push(format!(
                "{} cross-tabulation cell(s) have an expected count below 5; treat the chi-square p-value with care",
                chi.low_expected_cells
            ));
        }
    }

    if let Some(model) = report.clustering.completed()
        && let (Some(low), Some(high)) = (model.centroids.first(), model.centroids.last())
    {
        findings.push(format!(
            "k-means found {} segments, from {:.2} MB / {:.3} g ({} sites) to {:.2} MB / {:.3} g ({} sites)",
            model.k,
            low.size_bytes / emissions::BYTES_PER_MB,
            low.emissions_gco2e,
            low.members,
            high.size_bytes / emissions::BYTES_PER_MB,
            high.emissions_gco2e,
            high.members
        ));
    }

    if !descriptive.greenest_categories.is_empty() {
        let names: Vec<&str> = descriptive
            .greenest_categories
            .iter()
            .map(|c| c.as_str())
            .collect();
        findings.push(format!("Greenest categories: {}", names.join(", ")));
    }

    for (name, reason) in report.skipped_tests() {
        findings.push(format!("{name} not applicable: {reason}"));
    }

    findings
}

/// Write `summary.json` into `output_dir`
pub fn write_summary(summary: &Summary, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(artifacts::SUMMARY_JSON);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(path)
}
