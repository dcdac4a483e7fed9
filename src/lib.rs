//! carbon-eda synthesizes website carbon-emission records, runs descriptive
//! and inferential statistics over them, and writes charts, tabular exports
//! and a JSON summary of the findings.

pub mod analysis;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod reporting;
pub mod synthesis;
pub mod ui;

// Re-export commonly used items
pub use analysis::{AnalysisConfig, AnalysisReport, TestOutcome, analyze};
pub use config::{CliConfig, Config};
pub use core::{CarbonEdaError, Category, Dataset, Rating, Record, Result};
pub use pipeline::{RunOutcome, generate, run};
pub use reporting::{ReportConfig, Summary};
pub use synthesis::{RecordSource, SynthesisConfig, generate_dataset};
