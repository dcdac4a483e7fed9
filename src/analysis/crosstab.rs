//! Rating x hosting contingency table and chi-square test of independence

use serde::Serialize;

use crate::analysis::TestOutcome;
use crate::analysis::distributions::chi_square_survival;
use crate::core::constants::limits;
use crate::core::types::{Dataset, Rating};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabRow {
    pub rating: Rating,
    pub green: usize,
    pub non_green: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub cramers_v: f64,
    /// Cells whose expected count is below 5; the approximation is weak when non-zero
    pub low_expected_cells: usize,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    /// One row per rating, A to F
    pub rows: Vec<CrossTabRow>,
    pub green_total: usize,
    pub non_green_total: usize,
    pub total: usize,
    pub chi_square: TestOutcome<ChiSquareTest>,
}

pub fn crosstab(dataset: &Dataset, alpha: f64) -> CrossTab {
    let rows: Vec<CrossTabRow> = Rating::ALL
        .into_iter()
        .map(|rating| {
            let (green, non_green) = dataset
                .records()
                .iter()
                .filter(|r| r.rating == rating)
                .fold((0, 0), |(g, n), r| if r.is_green { (g + 1, n) } else { (g, n + 1) });
            CrossTabRow {
                rating,
                green,
                non_green,
                total: green + non_green,
            }
        })
        .collect();

    let green_total = rows.iter().map(|r| r.green).sum();
    let non_green_total = rows.iter().map(|r| r.non_green).sum();
    let chi_square = chi_square_test(&rows, green_total, non_green_total, alpha);

    CrossTab {
        rows,
        green_total,
        non_green_total,
        total: green_total + non_green_total,
        chi_square,
    }
}

fn chi_square_test(
    rows: &[CrossTabRow],
    green_total: usize,
    non_green_total: usize,
    alpha: f64,
) -> TestOutcome<ChiSquareTest> {
    if green_total == 0 || non_green_total == 0 {
        return TestOutcome::not_applicable("only one hosting type present");
    }

    let active: Vec<&CrossTabRow> = rows.iter().filter(|r| r.total > 0).collect();
    let degrees_of_freedom = active.len().saturating_sub(1);
    if degrees_of_freedom == 0 {
        return TestOutcome::not_applicable("only one rating present");
    }

    let n = (green_total + non_green_total) as f64;
    let column_totals = [green_total as f64, non_green_total as f64];
    let mut statistic = 0.0;
    let mut low_expected_cells = 0;
    for row in &active {
        for (observed, column_total) in [row.green, row.non_green].into_iter().zip(column_totals) {
            let expected = row.total as f64 * column_total / n;
            if expected < limits::MIN_EXPECTED_CELL_COUNT {
                low_expected_cells += 1;
            }
            statistic += (observed as f64 - expected).powi(2) / expected;
        }
    }

    let p_value = chi_square_survival(statistic, degrees_of_freedom as f64);
    // min(rows - 1, columns - 1) is 1 with two hosting columns
    let cramers_v = (statistic / n).sqrt();

    TestOutcome::Completed(ChiSquareTest {
        statistic,
        degrees_of_freedom,
        p_value,
        cramers_v,
        low_expected_cells,
        significant: p_value < alpha,
    })
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::core::types::{Category, Record};

    fn records(rows: &[(f64, bool, usize)]) -> Dataset {
        let mut records = Vec::new();
        for &(emissions, is_green, count) in rows {
            for _ in 0..count {
                records.push(Record::new(
                    "https://x.example".into(),
                    1_000_000,
                    is_green,
                    Category::Blog,
                    emissions,
                ));
            }
        }
        Dataset::new(records)
    }

    #[test]
    fn test_crosstab__counts_and_totals() {
        let dataset = records(&[(0.3, true, 3), (0.3, false, 1), (1.2, false, 2)]);
        let table = crosstab(&dataset, 0.05);

        assert_eq!(table.rows.len(), 6);
        assert_eq!(table.rows[0].green, 3);
        assert_eq!(table.rows[0].non_green, 1);
        assert_eq!(table.rows[3].total, 2);
        assert_eq!(table.green_total, 3);
        assert_eq!(table.non_green_total, 3);
        assert_eq!(table.total, 6);
    }

    #[test]
    fn test_chi_square__known_value() {
        // 2x2: [[20, 10], [10, 20]] -> chi2 = 60 * (400 - 100)^2 / (30^4) = 6.667
        let dataset = records(&[(0.3, true, 20), (0.3, false, 10), (0.8, true, 10), (0.8, false, 20)]);
        let table = crosstab(&dataset, 0.05);
        let test = table.chi_square.completed().unwrap();

        assert_eq!(test.degrees_of_freedom, 1);
        assert!((test.statistic - 20.0 / 3.0).abs() < 1e-9);
        assert!((test.p_value - 0.009_823).abs() < 1e-5);
        assert!((test.cramers_v - (1.0f64 / 9.0).sqrt()).abs() < 1e-9);
        assert_eq!(test.low_expected_cells, 0);
        assert!(test.significant);
    }

    #[test]
    fn test_chi_square__flags_small_expected_counts() {
        let dataset = records(&[(0.3, true, 2), (0.3, false, 1), (2.5, false, 2), (2.5, true, 1)]);
        let test = crosstab(&dataset, 0.05);
        let test = test.chi_square.completed().unwrap();
        assert_eq!(test.low_expected_cells, 4);
        assert!(!test.significant);
    }

    #[test]
    fn test_chi_square__not_applicable() {
        let single_rating = records(&[(0.3, true, 3), (0.3, false, 3)]);
        match crosstab(&single_rating, 0.05).chi_square {
            TestOutcome::NotApplicable { reason } => assert!(reason.contains("one rating")),
            other => panic!("unexpected {other:?}"),
        }

        let single_hosting = records(&[(0.3, true, 3), (1.8, true, 3)]);
        assert!(!crosstab(&single_hosting, 0.05).chi_square.is_applicable());
    }
}
