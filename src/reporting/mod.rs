//! Charts, exports and the run summary
//!
//! This module turns a dataset and its analysis report into files:
//! static SVG charts, interactive Plotly documents, the tabular exports
//! and `summary.json`. It also hosts the structured logging helpers.

pub mod charts;
pub mod export;
pub mod interactive;
pub mod logging;
pub mod summary;

use std::fs;
use std::path::PathBuf;

use crate::core::constants::defaults;
use crate::core::error::{CarbonEdaError, Result};

// Re-export commonly used items
pub use charts::render_static_charts;
pub use export::export_dataset;
pub use interactive::InteractiveCharts;
pub use summary::{ClusterAssignment, RunMetadata, Summary, findings, write_summary};

/// Where and what the reporters write
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub static_charts: bool,
    pub interactive_charts: bool,
    pub histogram_bins: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            static_charts: true,
            interactive_charts: true,
            histogram_bins: defaults::HISTOGRAM_BINS,
        }
    }
}

impl ReportConfig {
    /// Create the output directory (and parents) if missing
    pub fn ensure_output_dir(&self) -> Result<()> {
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(CarbonEdaError::Config(format!(
                "Output path '{}' exists and is not a directory.",
                self.output_dir.display()
            )));
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn test_ensure_output_dir__creates_nested() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = ReportConfig {
            output_dir: dir.path().join("a").join("b"),
            ..ReportConfig::default()
        };
        config.ensure_output_dir()?;
        assert!(config.output_dir.is_dir());
        // Idempotent
        config.ensure_output_dir()?;
        Ok(())
    }

    #[test]
    fn test_ensure_output_dir__rejects_file() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let config = ReportConfig {
            output_dir: file.path().to_path_buf(),
            ..ReportConfig::default()
        };
        assert!(matches!(
            config.ensure_output_dir(),
            Err(CarbonEdaError::Config(_))
        ));
        Ok(())
    }
}
