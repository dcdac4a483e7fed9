//! Descriptive statistics of the emissions column

use serde::Serialize;

use crate::core::constants::size_bands;
use crate::core::types::{Category, Dataset, Rating};

/// Summary of one group of emissions values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` below two values
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl GroupStats {
    /// `None` for an empty group
    pub fn compute(label: impl Into<String>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            label: label.into(),
            count: values.len(),
            mean: mean(values),
            median: quantile(&sorted, 0.5),
            std_dev: sample_variance(values).map(f64::sqrt),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub emissions: GroupStats,
    pub green_share_pct: f64,
    pub mean_size_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: Rating,
    pub count: usize,
    pub percent: f64,
    pub mean_emissions: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeBand {
    pub label: String,
    pub count: usize,
    pub mean_emissions: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub overall: Option<GroupStats>,
    /// Green first, then non-green; empty groups are left out
    pub by_hosting: Vec<GroupStats>,
    pub by_category: Vec<CategorySummary>,
    /// All six ratings, including empty ones
    pub ratings: Vec<RatingBucket>,
    pub size_bands: Vec<SizeBand>,
    /// Relative reduction of the green mean against the non-green mean
    pub green_savings_pct: Option<f64>,
    /// Up to three categories with the lowest mean emissions
    pub greenest_categories: Vec<Category>,
}

impl DescriptiveStats {
    pub fn hosting(&self, green: bool) -> Option<&GroupStats> {
        let label = hosting_label(green);
        self.by_hosting.iter().find(|g| g.label == label)
    }
}

pub fn hosting_label(green: bool) -> &'static str {
    if green { "green" } else { "non-green" }
}

pub fn describe(dataset: &Dataset) -> DescriptiveStats {
    let overall = GroupStats::compute("all", &dataset.emissions());

    let by_hosting: Vec<GroupStats> = [true, false]
        .into_iter()
        .filter_map(|green| {
            GroupStats::compute(hosting_label(green), &dataset.emissions_by_hosting(green))
        })
        .collect();

    let by_category: Vec<CategorySummary> = dataset
        .by_category()
        .into_iter()
        .filter_map(|(category, records)| {
            let values: Vec<f64> = records.iter().map(|r| r.emissions_gco2e).collect();
            let sizes: Vec<f64> = records.iter().map(|r| r.size_mb()).collect();
            let green = records.iter().filter(|r| r.is_green).count();
            Some(CategorySummary {
                category,
                emissions: GroupStats::compute(category.as_str(), &values)?,
                green_share_pct: green as f64 / records.len() as f64 * 100.0,
                mean_size_mb: mean(&sizes),
            })
        })
        .collect();

    let ratings = Rating::ALL
        .into_iter()
        .map(|rating| {
            let values: Vec<f64> = dataset
                .records()
                .iter()
                .filter(|r| r.rating == rating)
                .map(|r| r.emissions_gco2e)
                .collect();
            RatingBucket {
                rating,
                count: values.len(),
                percent: percent(values.len(), dataset.len()),
                mean_emissions: (!values.is_empty()).then(|| mean(&values)),
            }
        })
        .collect();

    let mut bands: Vec<Vec<f64>> = vec![Vec::new(); size_bands::LABELS.len()];
    for record in dataset.records() {
        let index = size_bands::BOUNDARIES_MB
            .iter()
            .position(|&upper| record.size_mb() < upper)
            .unwrap_or(size_bands::BOUNDARIES_MB.len());
        bands[index].push(record.emissions_gco2e);
    }
    let size_bands = size_bands::LABELS
        .iter()
        .zip(bands)
        .map(|(label, values)| SizeBand {
            label: label.to_string(),
            count: values.len(),
            mean_emissions: (!values.is_empty()).then(|| mean(&values)),
        })
        .collect();

    let green_savings_pct = match (
        by_hosting.iter().find(|g| g.label == hosting_label(true)),
        by_hosting.iter().find(|g| g.label == hosting_label(false)),
    ) {
        (Some(green), Some(other)) => Some((other.mean - green.mean) / other.mean * 100.0),
        _ => None,
    };

    let mut ranked: Vec<&CategorySummary> = by_category.iter().collect();
    ranked.sort_by(|a, b| a.emissions.mean.total_cmp(&b.emissions.mean));
    let greenest_categories = ranked.iter().take(3).map(|c| c.category).collect();

    DescriptiveStats {
        overall,
        by_hosting,
        by_category,
        ratings,
        size_bands,
        green_savings_pct,
        greenest_categories,
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator)
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Linear interpolation between closest ranks; `sorted` must be ascending and non-empty
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
