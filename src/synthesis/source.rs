//! The record source seam and its synthetic and CSV implementations

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{CarbonEdaError, Result};
use crate::core::types::{Category, Dataset, Rating, Record};
use crate::synthesis::api::CarbonApiSource;
use crate::synthesis::generator::{SynthesisConfig, generate_dataset};

/// Anything that can produce the table the analyzer consumes
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short human readable name, used in logs and the summary metadata
    fn describe(&self) -> String;

    async fn collect(&self) -> Result<Dataset>;
}

/// A site queried through the Website Carbon API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiTarget {
    pub url: String,
    pub category: Category,
}

/// Which source a run reads its records from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    Synthetic(SynthesisConfig),
    Csv(PathBuf),
    Api {
        base_url: String,
        targets: Vec<ApiTarget>,
        timeout: Duration,
    },
}

impl SourceKind {
    pub fn into_source(self) -> Result<Box<dyn RecordSource>> {
        Ok(match self {
            SourceKind::Synthetic(config) => Box::new(SyntheticSource::new(config)),
            SourceKind::Csv(path) => Box::new(CsvSource::new(path)),
            SourceKind::Api {
                base_url,
                targets,
                timeout,
            } => Box::new(CarbonApiSource::new(base_url, targets, timeout)?),
        })
    }
}

/// Seeded synthetic records
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    config: SynthesisConfig,
}

impl SyntheticSource {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RecordSource for SyntheticSource {
    fn describe(&self) -> String {
        format!(
            "synthetic ({} records, seed {})",
            self.config.record_count, self.config.seed
        )
    }

    async fn collect(&self) -> Result<Dataset> {
        generate_dataset(&self.config)
    }
}

/// A table previously written by the CSV exporter
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read and validate every row; ratings are recomputed from emissions
    pub fn load(path: &Path) -> Result<Dataset> {
        if !path.is_file() {
            return Err(CarbonEdaError::Config(format!(
                "Input file '{}' does not exist.",
                path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<Record>().enumerate() {
            let mut record = row?;
            record.validate().map_err(|e| {
                CarbonEdaError::Validation(format!("{} (row {})", e, index + 1))
            })?;
            record.rating = Rating::from_emissions(record.emissions_gco2e);
            records.push(record);
        }

        if records.is_empty() {
            return Err(CarbonEdaError::Validation(format!(
                "Input file '{}' contains no records.",
                path.display()
            )));
        }
        Ok(Dataset::new(records))
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv ({})", self.path.display())
    }

    async fn collect(&self) -> Result<Dataset> {
        Self::load(&self.path)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use std::io::Write;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    const HEADER: &str = "url,size_bytes,is_green,category,emissions_gco2e,rating\n";

    #[tokio::test]
    async fn test_synthetic_source__collects_configured_count() -> TestResult {
        let source = SyntheticSource::new(SynthesisConfig {
            record_count: 30,
            ..SynthesisConfig::default()
        });
        let dataset = source.collect().await?;
        assert_eq!(dataset.len(), 30);
        assert!(source.describe().contains("30 records"));
        Ok(())
    }

    #[tokio::test]
    async fn test_csv_source__recomputes_rating() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(HEADER.as_bytes())?;
        file.write_all(b"https://a.example,1200000,true,blog,0.35,F\n")?;
        file.write_all(b"https://b.example,5100000,false,e-commerce,2.4,F\n")?;

        let dataset = CsvSource::new(file.path().to_path_buf()).collect().await?;
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].rating, Rating::A);
        assert_eq!(dataset.records()[1].category, Category::ECommerce);
        assert_eq!(dataset.records()[1].rating, Rating::F);
        Ok(())
    }

    #[test]
    fn test_csv_source__rejects_invalid_rows() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(HEADER.as_bytes())?;
        file.write_all(b"https://a.example,0,true,blog,0.35,A\n")?;

        let err = CsvSource::load(file.path()).unwrap_err();
        assert!(matches!(err, CarbonEdaError::Validation(_)));
        assert!(format!("{err}").contains("row 1"));
        Ok(())
    }

    #[test]
    fn test_csv_source__rejects_unknown_category() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(HEADER.as_bytes())?;
        file.write_all(b"https://a.example,100,true,casino,0.35,A\n")?;

        let err = CsvSource::load(file.path()).unwrap_err();
        assert!(matches!(err, CarbonEdaError::Csv(_)));
        Ok(())
    }

    #[test]
    fn test_csv_source__empty_and_missing_files() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(HEADER.as_bytes())?;
        assert!(matches!(
            CsvSource::load(file.path()),
            Err(CarbonEdaError::Validation(_))
        ));

        assert!(matches!(
            CsvSource::load(Path::new("/definitely/missing/dataset.csv")),
            Err(CarbonEdaError::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn test_source_kind__into_source() -> TestResult {
        let source = SourceKind::Csv(PathBuf::from("data.csv")).into_source()?;
        assert_eq!(source.describe(), "csv (data.csv)");

        let source = SourceKind::Synthetic(SynthesisConfig::default()).into_source()?;
        assert!(source.describe().starts_with("synthetic"));
        Ok(())
    }
}
