//! Green vs non-green comparisons: Welch's t-test and the Mann-Whitney U test
//!
//! Both statistics are oriented so that a positive value means green hosting
//! has the lower emissions.

use serde::Serialize;

use crate::analysis::TestOutcome;
use crate::analysis::descriptive::{mean, sample_variance};
use crate::analysis::distributions::{normal_sf, student_t_two_sided_p};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelchTTest {
    /// `(non_green_mean - green_mean) / standard_error`
    pub t_statistic: f64,
    /// Welch-Satterthwaite approximation
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    /// Mean difference over the pooled standard deviation
    pub cohens_d: f64,
    pub green_mean: f64,
    pub non_green_mean: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MannWhitneyTest {
    /// U of the green group: pairs where the green value is larger, ties count half
    pub u_statistic: f64,
    pub z_score: f64,
    pub p_value: f64,
    /// `1 - 2U / (n1 n2)`; positive when green ranks lower
    pub rank_biserial: f64,
    pub significant: bool,
}

fn check_group_sizes<T>(green: &[f64], non_green: &[f64]) -> Option<TestOutcome<T>> {
    for (label, values) in [("green", green), ("non-green", non_green)] {
        if values.len() < 2 {
            return Some(TestOutcome::not_applicable(format!(
                "fewer than 2 records in the {label} group (n = {})",
                values.len()
            )));
        }
    }
    None
}

pub fn welch_t_test(green: &[f64], non_green: &[f64], alpha: f64) -> TestOutcome<WelchTTest> {
    if let Some(outcome) = check_group_sizes(green, non_green) {
        return outcome;
    }

    let (n1, n2) = (green.len() as f64, non_green.len() as f64);
    let (m1, m2) = (mean(green), mean(non_green));
    let v1 = sample_variance(green).unwrap_or(0.0);
    let v2 = sample_variance(non_green).unwrap_or(0.0);

    let (se1, se2) = (v1 / n1, v2 / n2);
    let se_squared = se1 + se2;
    if se_squared <= 0.0 {
        return TestOutcome::not_applicable("both groups have zero variance");
    }

    let t = (m2 - m1) / se_squared.sqrt();
    let df = se_squared.powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
    let p_value = student_t_two_sided_p(t, df);

    let pooled_sd = (((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0)).sqrt();
    let cohens_d = (m2 - m1) / pooled_sd;

    TestOutcome::Completed(WelchTTest {
        t_statistic: t,
        degrees_of_freedom: df,
        p_value,
        cohens_d,
        green_mean: m1,
        non_green_mean: m2,
        significant: p_value < alpha,
    })
}

/// Average ranks (1-based) of `values`, plus the tie correction term `sum(t^3 - t)`
fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_term = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end share the mean of ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = rank;
        }
        let tied = (end - start) as f64;
        tie_term += tied.powi(3) - tied;
        start = end;
    }
    (ranks, tie_term)
}

pub fn mann_whitney_u(green: &[f64], non_green: &[f64], alpha: f64) -> TestOutcome<MannWhitneyTest> {
    if let Some(outcome) = check_group_sizes(green, non_green) {
        return outcome;
    }

    let combined: Vec<f64> = green.iter().chain(non_green).copied().collect();
    let (ranks, tie_term) = average_ranks(&combined);

    let (n1, n2) = (green.len() as f64, non_green.len() as f64);
    let n = n1 + n2;
    let green_rank_sum: f64 = ranks[..green.len()].iter().sum();
    let u = green_rank_sum - n1 * (n1 + 1.0) / 2.0;

    let mean_u = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        return TestOutcome::not_applicable("all values tie");
    }
    let sd = variance.sqrt();

    let deviation = u - mean_u;
    let corrected = (deviation.abs() - 0.5).max(0.0) / sd;
    let p_value = (2.0 * normal_sf(corrected)).min(1.0);

    TestOutcome::Completed(MannWhitneyTest {
        u_statistic: u,
        z_score: deviation / sd,
        p_value,
        rank_biserial: 1.0 - 2.0 * u / (n1 * n2),
        significant: p_value < alpha,
    })
}

/// Conventional magnitude label for Cohen's d
pub fn effect_size_interpretation(d: f64) -> &'static str {
    let d_abs = d.abs();
    if d_abs < 0.2 {
        "negligible"
    } else if d_abs < 0.5 {
        "small"
    } else if d_abs < 0.8 {
        "medium"
    } else {
        "large"
    }
}

pub fn significance_stars(p: f64) -> &'static str {
    if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else {
        ""
    }
}
