//! Output formatting and display logic for carbon-eda

use std::fmt::Write;

use crate::analysis::{AnalysisReport, significance_stars};
use crate::core::constants::output_formats;
use crate::core::error::Result;
use crate::pipeline::RunOutcome;
use crate::ui::color::{Colors, colorize, rating_color, significance_color};

fn heading(text: &str) -> String {
    colorize(text, &format!("{}{}", Colors::BOLD, Colors::CYAN))
}

fn push_hosting_table(out: &mut String, report: &AnalysisReport) {
    let _ = writeln!(out, "\n{}", heading("Emissions by hosting (gCO2e)"));
    let _ = writeln!(
        out,
        "   {:<10} {:>6} {:>8} {:>8} {:>8}",
        "group", "n", "mean", "median", "sd"
    );
    for group in &report.descriptive.by_hosting {
        let sd = group
            .std_dev
            .map(|sd| format!("{sd:.3}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "   {:<10} {:>6} {:>8.3} {:>8.3} {:>8}",
            group.label, group.count, group.mean, group.median, sd
        );
    }
}

fn push_tests(out: &mut String, report: &AnalysisReport) {
    let _ = writeln!(out, "\n{}", heading("Tests"));
    let mut line = |name: &str, p: f64, significant: bool, detail: String| {
        let _ = writeln!(
            out,
            "   {:<20} p = {} {}",
            name,
            colorize(
                &format!("{p:.4}{}", significance_stars(p)),
                significance_color(significant)
            ),
            detail
        );
    };

    if let Some(t) = report.welch_t_test.completed() {
        line(
            "welch t-test",
            t.p_value,
            t.significant,
            format!("(t = {:.2}, d = {:.2})", t.t_statistic, t.cohens_d),
        );
    }
    if let Some(u) = report.mann_whitney.completed() {
        line(
            "mann-whitney u",
            u.p_value,
            u.significant,
            format!("(U = {:.1}, r = {:.2})", u.u_statistic, u.rank_biserial),
        );
    }
    if let Some(c) = report.correlation.completed() {
        line(
            "pearson correlation",
            c.p_value,
            c.significant,
            format!("(r = {:.3})", c.r),
        );
    }
    if let Some(chi) = report.crosstab.chi_square.completed() {
        line(
            "chi-square",
            chi.p_value,
            chi.significant,
            format!("(V = {:.2})", chi.cramers_v),
        );
    }
    for (name, reason) in report.skipped_tests() {
        let _ = writeln!(
            out,
            "   {:<20} {}",
            name,
            colorize(&format!("skipped: {reason}"), Colors::DIM)
        );
    }
}

fn push_ratings(out: &mut String, report: &AnalysisReport) {
    let _ = writeln!(out, "\n{}", heading("Carbon ratings"));
    let cells: Vec<String> = report
        .descriptive
        .ratings
        .iter()
        .map(|bucket| {
            format!(
                "{} {}",
                colorize(bucket.rating.as_str(), rating_color(bucket.rating)),
                bucket.count
            )
        })
        .collect();
    let _ = writeln!(out, "   {}", cells.join("  "));
}

/// Colorful report of the run
pub fn render_text(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    let metadata = &outcome.metadata;
    let _ = writeln!(
        out,
        "{} {} records from {}",
        colorize("🌱", Colors::BRIGHT_GREEN),
        metadata.record_count,
        metadata.source
    );

    if let Some(ref summary) = outcome.summary {
        push_hosting_table(&mut out, &summary.analysis);
        push_tests(&mut out, &summary.analysis);
        push_ratings(&mut out, &summary.analysis);

        let _ = writeln!(out, "\n{}", heading("Findings"));
        for finding in &summary.findings {
            let _ = writeln!(out, "   • {finding}");
        }
    }

    for warning in &outcome.warnings {
        let _ = writeln!(
            out,
            "\n{} {}",
            colorize("⚠️", Colors::BRIGHT_YELLOW),
            colorize(warning, Colors::YELLOW)
        );
    }

    let _ = writeln!(
        out,
        "\n{} Wrote {} file{} to {}",
        colorize("📁", Colors::BLUE),
        outcome.artifacts.len(),
        if outcome.artifacts.len() == 1 { "" } else { "s" },
        outcome.output_dir.display()
    );
    out
}

/// Plain findings and artifact paths, one per line
pub fn render_minimal(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    if let Some(ref summary) = outcome.summary {
        for finding in &summary.findings {
            let _ = writeln!(out, "{finding}");
        }
    }
    for warning in &outcome.warnings {
        let _ = writeln!(out, "WARNING {warning}");
    }
    for path in &outcome.artifacts {
        let _ = writeln!(out, "{}", path.display());
    }
    out
}

pub fn render_json(outcome: &RunOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Print the outcome in the requested format; quiet silences text output
pub fn display_outcome(outcome: &RunOutcome, output_format: &str, quiet: bool) -> Result<()> {
    match output_format {
        output_formats::JSON => println!("{}", render_json(outcome)?),
        output_formats::MINIMAL => print!("{}", render_minimal(outcome)),
        _ if quiet => {}
        _ => print!("{}", render_text(outcome)),
    }
    Ok(())
}
