//! Property-based tests for carbon-eda using proptest
//!
//! These tests generate random configurations and samples to check the
//! invariants of the synthesizer and the statistics across a wide range
//! of inputs.

use assert_cmd::prelude::*;
use proptest::prelude::*;
use std::process::Command;

use carbon_eda::analysis::descriptive::quantile;
use carbon_eda::analysis::{fit_kmeans, mann_whitney_u, welch_t_test};
use carbon_eda::core::constants::ratings;
use carbon_eda::synthesis::emission_model;
use carbon_eda::{Category, Rating, SynthesisConfig, generate_dataset};

const NAME: &str = "carbon-eda";

/// Non-empty subset of categories with positive weights
fn categories_strategy() -> impl Strategy<Value = Vec<(Category, f64)>> {
    prop::sample::subsequence(Category::ALL.to_vec(), 1..=Category::ALL.len()).prop_flat_map(
        |categories| {
            let len = categories.len();
            prop::collection::vec(0.1f64..5.0, len)
                .prop_map(move |weights| categories.iter().copied().zip(weights).collect())
        },
    )
}

/// Synthesis parameters the validator accepts
fn synthesis_strategy() -> impl Strategy<Value = SynthesisConfig> {
    (
        1usize..300,
        any::<u64>(),
        categories_strategy(),
        0.05f64..0.95,
        0.0f64..0.5,
    )
        .prop_map(
            |(record_count, seed, categories, green_discount, noise)| SynthesisConfig {
                record_count,
                seed,
                categories,
                green_discount,
                noise,
            },
        )
        .prop_filter("noise must keep green below non-green", |config| {
            config.validate().is_ok()
        })
}

/// Default categories with the noise just below the limit the validator
/// accepts for the drawn discount
fn boundary_synthesis_strategy() -> impl Strategy<Value = SynthesisConfig> {
    (1usize..300, any::<u64>(), 0.05f64..0.95, 0.90f64..0.999).prop_map(
        |(record_count, seed, green_discount, margin)| {
            // Largest noise still accepted: (1 - n) > (1 - d)(1 + n)
            let limit = green_discount / (2.0 - green_discount);
            SynthesisConfig {
                record_count,
                seed,
                green_discount,
                noise: limit * margin,
                ..SynthesisConfig::default()
            }
        },
    )
}

fn sample_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.05f64..5.0, 2..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_same_seed_same_dataset(config in synthesis_strategy()) {
        let first = generate_dataset(&config).unwrap();
        let second = generate_dataset(&config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_generated_records_are_valid(config in synthesis_strategy()) {
        let dataset = generate_dataset(&config).unwrap();
        prop_assert_eq!(dataset.len(), config.record_count);

        for record in dataset.records() {
            prop_assert!(record.validate().is_ok());
            prop_assert_eq!(record.rating, Rating::from_emissions(record.emissions_gco2e));
            prop_assert!(config.categories.iter().any(|(c, _)| *c == record.category));

            let profile = record.category.profile();
            prop_assert!(record.size_bytes >= profile.min_size_bytes);
            prop_assert!(record.size_bytes <= profile.max_size_bytes);
        }
    }

    #[test]
    fn test_hosting_split_is_balanced_per_category(config in synthesis_strategy()) {
        let dataset = generate_dataset(&config).unwrap();

        for (_, records) in dataset.by_category() {
            let green = records.iter().filter(|r| r.is_green).count();
            let non_green = records.len() - green;
            prop_assert!(green.abs_diff(non_green) <= 1);
        }
    }

    #[test]
    fn test_green_mean_below_non_green_mean_per_category(config in synthesis_strategy()) {
        let dataset = generate_dataset(&config).unwrap();

        for (category, records) in dataset.by_category() {
            let mean = |green: bool| {
                let values: Vec<f64> = records
                    .iter()
                    .filter(|r| r.is_green == green)
                    .map(|r| r.emissions_gco2e)
                    .collect();
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
            };
            if let (Some(green), Some(non_green)) = (mean(true), mean(false)) {
                prop_assert!(green < non_green, "{category}: {green} >= {non_green}");
            }
        }
    }

    #[test]
    fn test_green_mean_below_non_green_mean_near_noise_limit(
        config in boundary_synthesis_strategy()
    ) {
        prop_assert!(config.validate().is_ok());
        let dataset = generate_dataset(&config).unwrap();

        for (category, records) in dataset.by_category() {
            let green: Vec<f64> = records.iter().filter(|r| r.is_green).map(|r| r.emissions_gco2e).collect();
            let non_green: Vec<f64> = records.iter().filter(|r| !r.is_green).map(|r| r.emissions_gco2e).collect();
            if green.is_empty() || non_green.is_empty() {
                continue;
            }
            let green_mean = green.iter().sum::<f64>() / green.len() as f64;
            let non_green_mean = non_green.iter().sum::<f64>() / non_green.len() as f64;
            prop_assert!(green_mean < non_green_mean, "{category}: {green_mean} >= {non_green_mean}");
        }
    }

    #[test]
    fn test_default_discount_keeps_planted_effect(record_count in 2usize..300, seed in any::<u64>()) {
        let config = SynthesisConfig { record_count, seed, ..SynthesisConfig::default() };
        let dataset = generate_dataset(&config).unwrap();

        for (_, records) in dataset.by_category() {
            let mean = |green: bool| {
                let values: Vec<f64> = records.iter().filter(|r| r.is_green == green).map(|r| r.emissions_gco2e).collect();
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
            };
            if let (Some(green), Some(non_green)) = (mean(true), mean(false)) {
                prop_assert!(green < non_green);
            }
        }
    }

    #[test]
    fn test_emission_model_is_monotonic_in_size(
        small in 1u64..5_000_000,
        extra in 1u64..5_000_000,
        overhead in 0.0f64..0.5,
        green_discount in 0.1f64..0.9,
        is_green in any::<bool>(),
    ) {
        let lighter = emission_model(small, is_green, overhead, green_discount, 0.0);
        let heavier = emission_model(small + extra, is_green, overhead, green_discount, 0.0);
        prop_assert!(lighter < heavier);

        let green = emission_model(small, true, overhead, green_discount, 0.0);
        let non_green = emission_model(small, false, overhead, green_discount, 0.0);
        prop_assert!(green < non_green);
    }

    #[test]
    fn test_rating_is_monotonic(a in 0.0f64..5.0, b in 0.0f64..5.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Rating::from_emissions(low) <= Rating::from_emissions(high));

        let last_cut = ratings::CUT_POINTS[ratings::CUT_POINTS.len() - 1];
        if high >= last_cut {
            prop_assert_eq!(Rating::from_emissions(high), Rating::F);
        }
    }

    #[test]
    fn test_p_values_are_probabilities(green in sample_strategy(), non_green in sample_strategy()) {
        if let Some(t) = welch_t_test(&green, &non_green, 0.05).completed() {
            prop_assert!((0.0..=1.0).contains(&t.p_value));
            prop_assert_eq!(t.significant, t.p_value < 0.05);
        }
        if let Some(u) = mann_whitney_u(&green, &non_green, 0.05).completed() {
            prop_assert!((0.0..=1.0).contains(&u.p_value));
            prop_assert!((-1.0..=1.0).contains(&u.rank_biserial));
        }
    }

    #[test]
    fn test_quantile_stays_within_range(mut values in sample_strategy(), q in 0.0f64..=1.0) {
        values.sort_by(|a, b| a.total_cmp(b));
        let value = quantile(&values, q);
        prop_assert!(value >= values[0]);
        prop_assert!(value <= values[values.len() - 1]);
    }

    #[test]
    fn test_kmeans_labels_are_in_range(config in synthesis_strategy(), k in 1usize..6) {
        let dataset = generate_dataset(&config).unwrap();
        match fit_kmeans(&dataset, k, config.seed, 100).completed() {
            Some(model) => {
                prop_assert_eq!(model.labels.len(), dataset.len());
                prop_assert!(model.labels.iter().all(|&label| label < k));
                let members: usize = model.centroids.iter().map(|c| c.members).sum();
                prop_assert_eq!(members, dataset.len());
            }
            None => prop_assert!(dataset.len() < k),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))] // Each case spawns the binary

    #[test]
    fn test_generate_command_accepts_any_valid_size_and_seed(
        records in 1usize..500,
        seed in any::<u64>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut cmd = Command::cargo_bin(NAME).unwrap();
        cmd.env("NO_COLOR", "1")
            .arg("generate")
            .arg("--no-config")
            .arg("--no-progress")
            .arg("--format")
            .arg("minimal")
            .arg("--records")
            .arg(records.to_string())
            .arg("--seed")
            .arg(seed.to_string())
            .arg("--output-dir")
            .arg(dir.path());

        cmd.assert().success();
        let csv = std::fs::read_to_string(dir.path().join("dataset.csv")).unwrap();
        // Header plus one line per record
        prop_assert_eq!(csv.lines().count(), records + 1);
    }
}
