//! Static SVG charts
//!
//! Histogram binning and box summaries are layout concerns and live here; every
//! statistic shown on a chart comes from the [`AnalysisReport`].

use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisReport;
use crate::analysis::descriptive::{hosting_label, quantile};
use crate::core::constants::artifacts;
use crate::core::error::{CarbonEdaError, Result};
use crate::core::types::{Category, Dataset};

type DrawResult = std::result::Result<(), Box<dyn Error>>;

const CHART_SIZE: (u32, u32) = (1024, 640);
const GREEN_HOSTING: RGBColor = RGBColor(46, 139, 87);
const NON_GREEN_HOSTING: RGBColor = RGBColor(112, 112, 112);
const ACCENT: RGBColor = RGBColor(70, 130, 180);

/// Shared bin edges over `values`; a constant column gets a unit-wide range
pub fn histogram_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let bins = bins.max(1);
    let (mut min, mut max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !min.is_finite() {
        (min, max) = (0.0, 1.0);
    } else if max <= min {
        (min, max) = (min - 0.5, max + 0.5);
    }
    let width = (max - min) / bins as f64;
    (0..=bins).map(|i| min + width * i as f64).collect()
}

/// Count of `values` per bin; the last bin is closed on the right
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    let (min, max) = (edges[0], edges[bins]);
    let width = (max - min) / bins as f64;
    for &value in values {
        if value < min || value > max {
            continue;
        }
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

/// Five-number summary with 1.5 IQR whiskers
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub label: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - fence, q3 + fence);

        let inside = sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            label: label.into(),
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| !(low_fence..=high_fence).contains(v))
                .collect(),
        })
    }

    fn extent(&self) -> (f64, f64) {
        self.outliers.iter().fold(
            (self.lower_whisker, self.upper_whisker),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        )
    }
}

/// Label of the integer tick closest to `x`, empty between ticks
fn tick_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn padded_range(min: f64, max: f64) -> std::ops::Range<f64> {
    let pad = ((max - min) * 0.05).max(0.05);
    (min - pad)..(max + pad)
}

fn draw_histogram(path: &Path, dataset: &Dataset, bins: usize) -> DrawResult {
    let edges = histogram_edges(&dataset.emissions(), bins);
    let panels: Vec<(bool, Vec<usize>)> = [true, false]
        .into_iter()
        .map(|green| (green, bin_counts(&dataset.emissions_by_hosting(green), &edges)))
        .collect();
    let y_max = panels
        .iter()
        .flat_map(|(_, counts)| counts.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1) as f64
        * 1.1;

    let root = SVGBackend::new(path, (CHART_SIZE.0, CHART_SIZE.1 + 200)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((2, 1));

    for (area, (green, counts)) in areas.iter().zip(&panels) {
        let color = if *green { GREEN_HOSTING } else { NON_GREEN_HOSTING };
        let mut chart = ChartBuilder::on(area)
            .caption(
                format!("Emissions per page view, {} hosting", hosting_label(*green)),
                ("sans-serif", 20),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(edges[0]..edges[edges.len() - 1], 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_desc("gCO2e per page view")
            .y_desc("sites")
            .draw()?;

        chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
            Rectangle::new(
                [(edges[i], 0.0), (edges[i + 1], count as f64)],
                color.mix(0.7).filled(),
            )
        }))?;
    }

    root.present()?;
    Ok(())
}

fn draw_boxplot(path: &Path, title: &str, x_desc: &str, boxes: &[(BoxSummary, RGBColor)]) -> DrawResult {
    let labels: Vec<String> = boxes.iter().map(|(b, _)| b.label.clone()).collect();
    let (lo, hi) = boxes
        .iter()
        .map(|(b, _)| b.extent())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
    let n = boxes.len().max(1);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), padded_range(lo, hi))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&|x| tick_label(&labels, *x))
        .x_desc(x_desc)
        .y_desc("gCO2e per page view")
        .draw()?;

    for (i, (summary, color)) in boxes.iter().enumerate() {
        let x = i as f64;
        let (left, right) = (x - 0.3, x + 0.3);

        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, summary.q1), (right, summary.q3)],
            color.mix(0.45).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, summary.q1), (right, summary.q3)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(left, summary.median), (right, summary.median)],
            BLACK.stroke_width(2),
        )))?;

        // Whiskers and caps
        for (from, to) in [
            (summary.q3, summary.upper_whisker),
            (summary.q1, summary.lower_whisker),
        ] {
            chart.draw_series(std::iter::once(PathElement::new(vec![(x, from), (x, to)], BLACK)))?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x - 0.12, to), (x + 0.12, to)],
                BLACK,
            )))?;
        }

        chart.draw_series(
            summary
                .outliers
                .iter()
                .map(|&v| Circle::new((x, v), 3, BLACK.mix(0.6))),
        )?;
    }

    root.present()?;
    Ok(())
}

fn draw_scatter(path: &Path, dataset: &Dataset, report: &AnalysisReport) -> DrawResult {
    let sizes: Vec<f64> = dataset.records().iter().map(|r| r.size_mb()).collect();
    let emissions = dataset.emissions();
    let (x_lo, x_hi) = sizes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let (y_lo, y_hi) = emissions
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let caption = match report.correlation.completed() {
        Some(c) => format!("Page size vs emissions (r = {:.3})", c.r),
        None => "Page size vs emissions".to_string(),
    };

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(padded_range(x_lo, x_hi), padded_range(y_lo, y_hi))?;

    chart
        .configure_mesh()
        .x_desc("page size (MB)")
        .y_desc("gCO2e per page view")
        .draw()?;

    for green in [true, false] {
        let color = if green { GREEN_HOSTING } else { NON_GREEN_HOSTING };
        chart
            .draw_series(
                dataset
                    .records()
                    .iter()
                    .filter(|r| r.is_green == green)
                    .map(|r| Circle::new((r.size_mb(), r.emissions_gco2e), 4, color.mix(0.7).filled())),
            )?
            .label(format!("{} hosting", hosting_label(green)))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    if let Some(line) = report.trend_line {
        chart
            .draw_series(LineSeries::new(
                [x_lo, x_hi].map(|x| (x, line.at(x))),
                ACCENT.stroke_width(2),
            ))?
            .label(format!(
                "trend: {:.3} + {:.3} x size",
                line.intercept, line.slope
            ))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ACCENT));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// White at 0, red towards +1, blue towards -1
fn heat_color(value: f64) -> RGBColor {
    let fade = (255.0 * (1.0 - value.abs().min(1.0))) as u8;
    if value >= 0.0 {
        RGBColor(220, fade.max(40), fade.max(40))
    } else {
        RGBColor(fade.max(40), fade.max(40), 220)
    }
}

fn draw_correlation_matrix(path: &Path, report: &AnalysisReport) -> DrawResult {
    let matrix = &report.correlation_matrix;
    let labels = &matrix.labels;
    let n = labels.len().max(1);
    // Row 0 is drawn at the top
    let row_labels: Vec<String> = labels.iter().rev().cloned().collect();

    let root = SVGBackend::new(path, (760, 680)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation matrix (Pearson r)", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(120)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), -0.5..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n + 1)
        .y_labels(n + 1)
        .x_label_formatter(&|x| tick_label(labels, *x))
        .y_label_formatter(&|y| tick_label(&row_labels, *y))
        .draw()?;

    for (i, row) in matrix.values.iter().enumerate() {
        let y = (n - 1 - i) as f64;
        for (j, value) in row.iter().enumerate() {
            let x = j as f64;
            let fill = value.map(heat_color).unwrap_or(RGBColor(230, 230, 230));
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                fill.filled(),
            )))?;
            let text = value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string());
            chart.draw_series(std::iter::once(Text::new(
                text,
                (x - 0.15, y + 0.05),
                ("sans-serif", 18).into_font(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_rating_distribution(path: &Path, report: &AnalysisReport) -> DrawResult {
    let buckets = &report.descriptive.ratings;
    let labels: Vec<String> = buckets.iter().map(|b| b.rating.to_string()).collect();
    let y_max = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.15;
    let n = buckets.len().max(1);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Carbon rating distribution", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&|x| tick_label(&labels, *x))
        .x_desc("rating")
        .y_desc("sites")
        .draw()?;

    for (i, bucket) in buckets.iter().enumerate() {
        let x = i as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.35, 0.0), (x + 0.35, bucket.count as f64)],
            ACCENT.mix(0.8).filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{} ({:.1}%)", bucket.count, bucket.percent),
            (x - 0.25, bucket.count as f64 + y_max * 0.05),
            ("sans-serif", 14).into_font(),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn chart_error(path: &Path, err: Box<dyn Error>) -> CarbonEdaError {
    CarbonEdaError::Chart(format!("Could not render '{}': {}", path.display(), err))
}

/// Render every static chart into `output_dir` and return the written paths
pub fn render_static_charts(
    dataset: &Dataset,
    report: &AnalysisReport,
    output_dir: &Path,
    histogram_bins: usize,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let mut render = |name: &str, draw: &dyn Fn(&Path) -> DrawResult| -> Result<()> {
        let path = output_dir.join(name);
        draw(&path).map_err(|e| chart_error(&path, e))?;
        written.push(path);
        Ok(())
    };

    render(artifacts::HISTOGRAM_SVG, &|p| draw_histogram(p, dataset, histogram_bins))?;

    let category_boxes: Vec<(BoxSummary, RGBColor)> = dataset
        .by_category()
        .into_iter()
        .filter_map(|(category, records)| {
            let values: Vec<f64> = records.iter().map(|r| r.emissions_gco2e).collect();
            BoxSummary::from_values(category.as_str(), &values).map(|b| (b, category_color(category)))
        })
        .collect();
    render(artifacts::CATEGORY_BOXPLOT_SVG, &|p| {
        draw_boxplot(p, "Emissions by category", "category", &category_boxes)
    })?;

    let hosting_boxes: Vec<(BoxSummary, RGBColor)> = [true, false]
        .into_iter()
        .filter_map(|green| {
            let color = if green { GREEN_HOSTING } else { NON_GREEN_HOSTING };
            BoxSummary::from_values(hosting_label(green), &dataset.emissions_by_hosting(green))
                .map(|b| (b, color))
        })
        .collect();
    render(artifacts::HOSTING_BOXPLOT_SVG, &|p| {
        draw_boxplot(p, "Emissions by hosting type", "hosting", &hosting_boxes)
    })?;

    render(artifacts::SCATTER_SVG, &|p| draw_scatter(p, dataset, report))?;
    render(artifacts::CORRELATION_SVG, &|p| draw_correlation_matrix(p, report))?;
    render(artifacts::RATING_SVG, &|p| draw_rating_distribution(p, report))?;

    Ok(written)
}

fn category_color(category: Category) -> RGBColor {
    match category {
        Category::Blog => RGBColor(102, 194, 165),
        Category::ECommerce => RGBColor(252, 141, 98),
        Category::News => RGBColor(141, 160, 203),
        Category::Corporate => RGBColor(231, 138, 195),
        Category::Portfolio => RGBColor(166, 216, 84),
        Category::Streaming => RGBColor(229, 196, 148),
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::analysis::{AnalysisConfig, analyze};
    use crate::core::types::Record;
    use crate::synthesis::{SynthesisConfig, generate_dataset};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    const ALL_CHARTS: [&str; 6] = [
        artifacts::HISTOGRAM_SVG,
        artifacts::CATEGORY_BOXPLOT_SVG,
        artifacts::HOSTING_BOXPLOT_SVG,
        artifacts::SCATTER_SVG,
        artifacts::CORRELATION_SVG,
        artifacts::RATING_SVG,
    ];

    fn assert_svgs_written(dir: &Path, written: &[PathBuf]) -> TestResult {
        assert_eq!(written.len(), ALL_CHARTS.len());
        for name in ALL_CHARTS {
            let path = dir.join(name);
            assert!(written.contains(&path), "{name} not reported");
            let content = std::fs::read_to_string(&path)?;
            assert!(content.contains("<svg"), "{name} is not an SVG document");
        }
        Ok(())
    }

    #[test]
    fn test_render_static_charts__default_dataset() -> TestResult {
        let dir = tempfile::tempdir()?;
        let dataset = generate_dataset(&SynthesisConfig::default())?;
        let report = analyze(&dataset, &AnalysisConfig::default());

        let written = render_static_charts(&dataset, &report, dir.path(), 20)?;
        assert_svgs_written(dir.path(), &written)
    }

    #[test]
    fn test_render_static_charts__single_record() -> TestResult {
        let dir = tempfile::tempdir()?;
        let dataset = Dataset::new(vec![Record::new(
            "https://only.example".into(),
            900_000,
            false,
            Category::Blog,
            0.5,
        )]);
        let report = analyze(&dataset, &AnalysisConfig::default());

        let written = render_static_charts(&dataset, &report, dir.path(), 5)?;
        assert_svgs_written(dir.path(), &written)
    }

    #[test]
    fn test_render_static_charts__missing_directory_is_chart_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let dataset = generate_dataset(&SynthesisConfig {
            record_count: 10,
            ..SynthesisConfig::default()
        })?;
        let report = analyze(&dataset, &AnalysisConfig::default());

        let result = render_static_charts(&dataset, &report, &dir.path().join("missing"), 5);
        assert!(matches!(result, Err(CarbonEdaError::Chart(_))));
        Ok(())
    }

    #[test]
    fn test_histogram_edges__spans_values() {
        let edges = histogram_edges(&[1.0, 3.0, 2.0], 4);
        assert_eq!(edges, vec![1.0, 1.5, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn test_histogram_edges__degenerate_inputs() {
        assert_eq!(histogram_edges(&[2.0, 2.0], 2), vec![1.5, 2.0, 2.5]);
        assert_eq!(histogram_edges(&[], 1), vec![0.0, 1.0]);
        assert_eq!(histogram_edges(&[1.0, 2.0], 0).len(), 2);
    }

    #[test]
    fn test_bin_counts__includes_right_edge() {
        let edges = histogram_edges(&[0.0, 10.0], 5);
        let counts = bin_counts(&[0.0, 1.9, 2.0, 9.99, 10.0, 11.0], &edges);
        assert_eq!(counts, vec![2, 1, 0, 0, 2]);
    }

    #[test]
    fn test_bin_counts__shared_edges_partition_groups() {
        let green = [0.3, 0.5, 0.6];
        let grey = [0.7, 1.2, 1.9, 2.4];
        let all: Vec<f64> = green.iter().chain(&grey).copied().collect();
        let edges = histogram_edges(&all, 6);
        let total: usize = bin_counts(&green, &edges).iter().sum::<usize>()
            + bin_counts(&grey, &edges).iter().sum::<usize>();
        assert_eq!(total, all.len());
    }

    #[test]
    fn test_box_summary__quartiles_and_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 30.0];
        let summary = BoxSummary::from_values("x", &values).unwrap();
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 8.0);
        assert_eq!(summary.outliers, vec![30.0]);
        assert_eq!(summary.extent(), (1.0, 30.0));
    }

    #[test]
    fn test_box_summary__single_value_and_empty() {
        let summary = BoxSummary::from_values("one", &[0.8]).unwrap();
        assert_eq!(summary.q1, 0.8);
        assert_eq!(summary.upper_whisker, 0.8);
        assert!(summary.outliers.is_empty());
        assert!(BoxSummary::from_values("none", &[]).is_none());
    }

    #[test]
    fn test_tick_label() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(tick_label(&labels, 0.0), "A");
        assert_eq!(tick_label(&labels, 1.0), "B");
        assert_eq!(tick_label(&labels, 0.5), "");
        assert_eq!(tick_label(&labels, 2.0), "");
        assert_eq!(tick_label(&labels, -1.0), "");
    }

    #[test]
    fn test_heat_color() {
        assert_eq!(heat_color(0.0).rgb(), (220, 255, 255));
        assert_eq!(heat_color(1.0).rgb(), (220, 40, 40));
        assert_eq!(heat_color(-1.0).rgb(), (40, 40, 220));
    }
}
