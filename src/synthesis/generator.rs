//! Seeded synthetic dataset generation
//!
//! Every record's emissions come from [`emission_model`], a pure function of
//! page weight, hosting flag, category overhead and a pre-drawn noise value.
//! Randomness lives only in [`generate_dataset`], which draws from a
//! `ChaCha8Rng` so a seed reproduces the exact same table on every platform.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use crate::core::constants::{defaults, emissions, limits};
use crate::core::error::{CarbonEdaError, Result};
use crate::core::types::{Category, Dataset, Record};

/// Parameters of one synthesis run
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    pub record_count: usize,
    pub seed: u64,
    pub categories: Vec<(Category, f64)>,
    pub green_discount: f64,
    pub noise: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            record_count: defaults::RECORD_COUNT,
            seed: defaults::SEED,
            categories: Category::ALL
                .into_iter()
                .zip(defaults::CATEGORY_WEIGHTS)
                .collect(),
            green_discount: emissions::DEFAULT_GREEN_DISCOUNT,
            noise: emissions::DEFAULT_NOISE,
        }
    }
}

impl SynthesisConfig {
    /// Reject configurations that cannot produce a valid table
    pub fn validate(&self) -> Result<()> {
        if self.record_count == 0 {
            return Err(CarbonEdaError::Config(
                "Record count cannot be 0. Expected a positive integer.".to_string(),
            ));
        }
        if self.record_count > limits::MAX_RECORD_COUNT {
            return Err(CarbonEdaError::Config(format!(
                "Record count of {} is above the limit of {}.",
                self.record_count,
                limits::MAX_RECORD_COUNT
            )));
        }
        if self.categories.is_empty() {
            return Err(CarbonEdaError::Config(
                "Category list cannot be empty. Expected at least one category.".to_string(),
            ));
        }
        if let Some((category, weight)) = self
            .categories
            .iter()
            .find(|(_, w)| !(w.is_finite() && *w > 0.0))
        {
            return Err(CarbonEdaError::Config(format!(
                "Weight {weight} for category '{category}' is invalid. Expected a positive number."
            )));
        }
        if !(self.green_discount > 0.0 && self.green_discount < 1.0) {
            return Err(CarbonEdaError::Config(format!(
                "Green discount {} is invalid. Expected a value between 0 and 1 (exclusive).",
                self.green_discount
            )));
        }
        if !(0.0..1.0).contains(&self.noise)
            || (1.0 - self.noise) <= (1.0 - self.green_discount) * (1.0 + self.noise)
        {
            return Err(CarbonEdaError::Config(format!(
                "Noise {} is invalid for a green discount of {}.",
                self.noise, self.green_discount
            )));
        }
        Ok(())
    }
}

/// Emissions in gCO2e for one page view.
///
/// Transfer emissions grow linearly with `size_bytes`; green hosting scales the
/// total by `1 - green_discount` and `noise_draw` is applied multiplicatively.
pub fn emission_model(
    size_bytes: u64,
    is_green: bool,
    overhead_gco2e: f64,
    green_discount: f64,
    noise_draw: f64,
) -> f64 {
    let size_gb = size_bytes as f64 / emissions::BYTES_PER_GB;
    let transfer = size_gb * emissions::KWH_PER_GB * emissions::GRID_INTENSITY_G_PER_KWH;
    let hosting_factor = if is_green { 1.0 - green_discount } else { 1.0 };
    (overhead_gco2e + transfer) * hosting_factor * (1.0 + noise_draw)
}

/// Generate a full table from the configuration.
///
/// Rows of a category are matched in pairs sharing one size draw, one green and
/// one not, so the hosting split stays balanced within each category. An
/// unpaired last row takes the mean size of its category's pairs.
pub fn generate_dataset(config: &SynthesisConfig) -> Result<Dataset> {
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let weights = WeightedIndex::new(config.categories.iter().map(|(_, w)| *w))
        .map_err(|e| CarbonEdaError::Config(format!("Invalid category weights: {e}")))?;

    let row_categories: Vec<Category> = (0..config.record_count)
        .map(|_| config.categories[weights.sample(&mut rng)].0)
        .collect();

    let mut rows_by_category: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (row, category) in row_categories.iter().enumerate() {
        rows_by_category.entry(*category).or_default().push(row);
    }

    let mut drafts: Vec<(u64, bool)> = vec![(0, false); config.record_count];
    for (category, rows) in &rows_by_category {
        let profile = category.profile();
        let mut pair_sizes: Vec<u64> = Vec::with_capacity(rows.len() / 2);

        for chunk in rows.chunks(2) {
            match *chunk {
                [first, second] => {
                    let size = rng.gen_range(profile.min_size_bytes..=profile.max_size_bytes);
                    let first_is_green = rng.gen_bool(0.5);
                    drafts[first] = (size, first_is_green);
                    drafts[second] = (size, !first_is_green);
                    pair_sizes.push(size);
                }
                [single] => {
                    let size = if pair_sizes.is_empty() {
                        rng.gen_range(profile.min_size_bytes..=profile.max_size_bytes)
                    } else {
                        let total: u64 = pair_sizes.iter().sum();
                        (total as f64 / pair_sizes.len() as f64).round() as u64
                    };
                    drafts[single] = (size, rng.gen_bool(0.5));
                }
                _ => {}
            }
        }
    }

    let records = row_categories
        .iter()
        .zip(drafts)
        .enumerate()
        .map(|(row, (&category, (size_bytes, is_green)))| {
            let noise_draw = if config.noise > 0.0 {
                rng.gen_range(-config.noise..=config.noise)
            } else {
                0.0
            };
            let emissions_gco2e = emission_model(
                size_bytes,
                is_green,
                category.profile().overhead_gco2e,
                config.green_discount,
                noise_draw,
            );
            Record::new(
                format!("https://{}-{:04}.example", category, row + 1),
                size_bytes,
                is_green,
                category,
                emissions_gco2e,
            )
        })
        .collect();

    Ok(Dataset::new(records))
}

/// Whether the green share lies within `tolerance` of an even split
pub fn hosting_split_within(dataset: &Dataset, tolerance: f64) -> bool {
    (dataset.green_share() - 0.5).abs() <= tolerance
}
