//! Interactive Plotly chart documents

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisReport;
use crate::analysis::descriptive::hosting_label;
use crate::core::constants::artifacts;
use crate::core::error::Result;
use crate::core::types::{Dataset, Record};
use crate::reporting::charts::histogram_edges;

/// Constants for interactive chart styling
mod interactive_constants {
    /// Plotly CDN URL for rendering charts
    pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

    pub const GREEN_HOSTING: &str = "#2e8b57";
    pub const NON_GREEN_HOSTING: &str = "#707070";
    pub const ACCENT: &str = "#4682b4";
}

use interactive_constants::{ACCENT, GREEN_HOSTING, NON_GREEN_HOSTING, PLOTLY_CDN};

/// Standalone Plotly documents with pan, zoom and hover
pub struct InteractiveCharts;

impl InteractiveCharts {
    /// Write the scatter, histogram and box plot documents into `output_dir`
    pub fn write_all(
        dataset: &Dataset,
        report: &AnalysisReport,
        output_dir: &Path,
        histogram_bins: usize,
    ) -> Result<Vec<PathBuf>> {
        let documents = [
            (
                artifacts::INTERACTIVE_SCATTER,
                "Page size vs emissions",
                Self::scatter_traces(dataset, report),
                json!({
                    "xaxis": { "title": { "text": "page size (MB)" } },
                    "yaxis": { "title": { "text": "gCO2e per page view" } },
                    "hovermode": "closest",
                }),
            ),
            (
                artifacts::INTERACTIVE_HISTOGRAM,
                "Emissions distribution by hosting",
                Self::histogram_traces(dataset, histogram_bins),
                json!({
                    "barmode": "overlay",
                    "xaxis": { "title": { "text": "gCO2e per page view" } },
                    "yaxis": { "title": { "text": "sites" } },
                }),
            ),
            (
                artifacts::INTERACTIVE_BOXPLOT,
                "Emissions by category and hosting",
                Self::boxplot_traces(dataset),
                json!({
                    "boxmode": "group",
                    "xaxis": { "title": { "text": "category" } },
                    "yaxis": { "title": { "text": "gCO2e per page view" } },
                }),
            ),
        ];

        let mut written = Vec::with_capacity(documents.len());
        for (file_name, title, traces, layout) in documents {
            let path = output_dir.join(file_name);
            let html = Self::generate_html(title, &Self::subtitle(report), &traces, &layout)?;
            fs::write(&path, html)?;
            written.push(path);
        }
        Ok(written)
    }

    fn hover_text(record: &Record) -> String {
        format!(
            "{}<br>category: {}<br>rating: {}<br>size: {:.2} MB<br>emissions: {:.3} gCO2e",
            record.url,
            record.category,
            record.rating,
            record.size_mb(),
            record.emissions_gco2e
        )
    }

    fn hosting_color(green: bool) -> &'static str {
        if green { GREEN_HOSTING } else { NON_GREEN_HOSTING }
    }

    fn scatter_traces(dataset: &Dataset, report: &AnalysisReport) -> Value {
        let mut traces: Vec<Value> = [true, false]
            .into_iter()
            .map(|green| {
                let records: Vec<&Record> =
                    dataset.records().iter().filter(|r| r.is_green == green).collect();
                json!({
                    "type": "scatter",
                    "mode": "markers",
                    "name": format!("{} hosting", hosting_label(green)),
                    "x": records.iter().map(|r| r.size_mb()).collect::<Vec<_>>(),
                    "y": records.iter().map(|r| r.emissions_gco2e).collect::<Vec<_>>(),
                    "text": records.iter().map(|r| Self::hover_text(r)).collect::<Vec<_>>(),
                    "hoverinfo": "text",
                    "marker": { "color": Self::hosting_color(green), "size": 8, "opacity": 0.75 },
                })
            })
            .collect();

        if let Some(line) = report.trend_line {
            let (lo, hi) = dataset
                .records()
                .iter()
                .map(|r| r.size_mb())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
            traces.push(json!({
                "type": "scatter",
                "mode": "lines",
                "name": format!("trend ({:.3} gCO2e per MB)", line.slope),
                "x": [lo, hi],
                "y": [line.at(lo), line.at(hi)],
                "line": { "color": ACCENT, "width": 2 },
                "hoverinfo": "skip",
            }));
        }
        Value::Array(traces)
    }

    fn histogram_traces(dataset: &Dataset, bins: usize) -> Value {
        let edges = histogram_edges(&dataset.emissions(), bins);
        let start = edges[0];
        let end = edges[edges.len() - 1];
        let size = (end - start) / (edges.len() - 1) as f64;

        Value::Array(
            [true, false]
                .into_iter()
                .map(|green| {
                    json!({
                        "type": "histogram",
                        "name": format!("{} hosting", hosting_label(green)),
                        "x": dataset.emissions_by_hosting(green),
                        "xbins": { "start": start, "end": end, "size": size },
                        "marker": { "color": Self::hosting_color(green) },
                        "opacity": 0.6,
                    })
                })
                .collect(),
        )
    }

    fn boxplot_traces(dataset: &Dataset) -> Value {
        Value::Array(
            [true, false]
                .into_iter()
                .map(|green| {
                    let records: Vec<&Record> =
                        dataset.records().iter().filter(|r| r.is_green == green).collect();
                    json!({
                        "type": "box",
                        "name": format!("{} hosting", hosting_label(green)),
                        "x": records.iter().map(|r| r.category.as_str()).collect::<Vec<_>>(),
                        "y": records.iter().map(|r| r.emissions_gco2e).collect::<Vec<_>>(),
                        "text": records.iter().map(|r| Self::hover_text(r)).collect::<Vec<_>>(),
                        "boxpoints": "all",
                        "jitter": 0.3,
                        "marker": { "color": Self::hosting_color(green) },
                    })
                })
                .collect(),
        )
    }

    fn subtitle(report: &AnalysisReport) -> String {
        match report.welch_t_test.completed() {
            Some(t) => format!(
                "{} sites, Welch t = {:.2}, p = {:.4}",
                report.record_count, t.t_statistic, t.p_value
            ),
            None => format!("{} sites", report.record_count),
        }
    }

    /// JSON safe to inline in a `<script>` element
    fn script_json(value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
    }

    fn generate_html(title: &str, subtitle: &str, traces: &Value, layout: &Value) -> Result<String> {
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - carbon-eda</title>
    <script src="{cdn}"></script>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{title}</h1>
            <p>{subtitle}</p>
        </div>
        <div id="chart" class="chart-container"></div>
    </div>
    <script>
        const traces = {traces};
        const layout = Object.assign({{ margin: {{ t: 30 }} }}, {layout});
        Plotly.newPlot('chart', traces, layout, {{ responsive: true, scrollZoom: true }});
    </script>
</body>
</html>"#,
            title = title,
            subtitle = subtitle,
            cdn = PLOTLY_CDN,
            css = Self::generate_css(),
            traces = Self::script_json(traces)?,
            layout = Self::script_json(layout)?,
        ))
    }

    fn generate_css() -> &'static str {
        r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background-color: #f8fafc;
            color: #1e293b;
        }

        .container {
            max-width: 1200px;
            margin: 0 auto;
            padding: 2rem;
        }

        .header {
            margin-bottom: 1.5rem;
            padding: 1.5rem 2rem;
            background: linear-gradient(135deg, #2e8b57, #3cb371);
            color: white;
            border-radius: 12px;
        }

        .header p { opacity: 0.9; }

        .chart-container {
            height: 640px;
            background: #ffffff;
            border: 1px solid #e2e8f0;
            border-radius: 12px;
        }
        "#
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::analysis::{AnalysisConfig, analyze};
    use crate::core::types::Category;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Record::new("https://a.example".into(), 900_000, true, Category::Blog, 0.35),
            Record::new("https://b.example".into(), 900_000, false, Category::Blog, 0.44),
            Record::new("https://c.example".into(), 3_100_000, true, Category::News, 1.05),
            Record::new("https://d.example".into(), 3_100_000, false, Category::News, 1.31),
        ])
    }

    #[test]
    fn test_generate_html__embeds_data_and_cdn() -> TestResult {
        let traces = json!([{ "type": "scatter", "x": [1.5], "y": [0.4] }]);
        let html = InteractiveCharts::generate_html("Title", "4 sites", &traces, &json!({}))?;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("<title>Title - carbon-eda</title>"));
        assert!(html.contains(r#""x":[1.5]"#));
        assert!(html.contains("Plotly.newPlot('chart'"));
        Ok(())
    }

    #[test]
    fn test_script_json__escapes_closing_tags() -> TestResult {
        let value = json!({ "text": "</script><script>alert(1)</script>" });
        let escaped = InteractiveCharts::script_json(&value)?;
        assert!(!escaped.contains("</script>"));
        assert!(escaped.contains("<\\/script>"));
        Ok(())
    }

    #[test]
    fn test_scatter_traces__hover_and_trend() {
        let dataset = sample();
        let report = analyze(&dataset, &AnalysisConfig::default());
        let traces = InteractiveCharts::scatter_traces(&dataset, &report);
        let traces = traces.as_array().unwrap();

        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0]["name"], "green hosting");
        assert_eq!(traces[0]["x"].as_array().unwrap().len(), 2);
        let hover = traces[0]["text"][0].as_str().unwrap();
        assert!(hover.contains("https://a.example"));
        assert!(hover.contains("rating: A"));
        assert_eq!(traces[2]["mode"], "lines");
    }

    #[test]
    fn test_histogram_traces__share_bins() {
        let traces = InteractiveCharts::histogram_traces(&sample(), 5);
        let traces = traces.as_array().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0]["xbins"], traces[1]["xbins"]);
        assert_eq!(traces[0]["xbins"]["start"], 0.35);
    }

    #[test]
    fn test_write_all__creates_documents() -> TestResult {
        let dir = tempfile::tempdir()?;
        let dataset = sample();
        let report = analyze(&dataset, &AnalysisConfig::default());

        let written = InteractiveCharts::write_all(&dataset, &report, dir.path(), 10)?;
        assert_eq!(written.len(), 3);
        for path in &written {
            let html = fs::read_to_string(path)?;
            assert!(html.contains("carbon-eda"));
        }
        assert!(dir.path().join(artifacts::INTERACTIVE_BOXPLOT).exists());
        Ok(())
    }
}
