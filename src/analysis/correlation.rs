//! Pearson correlation, least squares trend line and the correlation matrix

use serde::Serialize;

use crate::analysis::TestOutcome;
use crate::analysis::descriptive::mean;
use crate::analysis::distributions::student_t_two_sided_p;
use crate::core::types::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PearsonCorrelation {
    pub r: f64,
    pub n: usize,
    pub t_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
}

/// Least squares fit of emissions (gCO2e) on page size (MB)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Pairwise Pearson coefficients; `None` where a column is constant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// Centered sums `(sxx, syy, sxy)`
fn centered_sums(x: &[f64], y: &[f64]) -> (f64, f64, f64) {
    let (mx, my) = (mean(x), mean(y));
    x.iter().zip(y).fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), (a, b)| {
        let (dx, dy) = (a - mx, b - my);
        (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
    })
}

/// Pearson coefficient, or `None` for fewer than two pairs or a constant column
pub fn pearson_r(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (sxx, syy, sxy) = centered_sums(x, y);
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

pub fn pearson(x: &[f64], y: &[f64], alpha: f64) -> TestOutcome<PearsonCorrelation> {
    let n = x.len().min(y.len());
    if n < 3 {
        return TestOutcome::not_applicable(format!("fewer than 3 records (n = {n})"));
    }
    let Some(r) = pearson_r(x, y) else {
        return TestOutcome::not_applicable("a column is constant");
    };

    let df = (n - 2) as f64;
    let remainder = 1.0 - r * r;
    let t_statistic = if remainder <= 0.0 {
        f64::INFINITY.copysign(r)
    } else {
        r * (df / remainder).sqrt()
    };
    let p_value = student_t_two_sided_p(t_statistic, df);

    TestOutcome::Completed(PearsonCorrelation {
        r,
        n,
        t_statistic,
        p_value,
        significant: p_value < alpha,
    })
}

pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<TrendLine> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (sxx, _, sxy) = centered_sums(x, y);
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(TrendLine {
        slope,
        intercept: mean(y) - slope * mean(x),
    })
}

pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let records = dataset.records();
    let columns: [(&str, Vec<f64>); 4] = [
        ("size_mb", records.iter().map(|r| r.size_mb()).collect()),
        ("emissions_gco2e", records.iter().map(|r| r.emissions_gco2e).collect()),
        ("is_green", records.iter().map(|r| f64::from(u8::from(r.is_green))).collect()),
        ("rating", records.iter().map(|r| f64::from(r.rating.ordinal())).collect()),
    ];

    let values = columns
        .iter()
        .map(|(_, a)| columns.iter().map(|(_, b)| pearson_r(a, b)).collect())
        .collect();

    CorrelationMatrix {
        labels: columns.iter().map(|(label, _)| label.to_string()).collect(),
        values,
    }
}
