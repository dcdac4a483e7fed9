//! Tabular export of the dataset
//!
//! `dataset.csv` and `dataset.json` carry the same rows; the CSV file can be
//! fed back in with `--input`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::constants::artifacts;
use crate::core::error::Result;
use crate::core::types::Dataset;

pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in dataset.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, dataset)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write both serialisations into `output_dir`
pub fn export_dataset(dataset: &Dataset, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let csv_path = output_dir.join(artifacts::DATASET_CSV);
    let json_path = output_dir.join(artifacts::DATASET_JSON);
    write_csv(dataset, &csv_path)?;
    write_json(dataset, &json_path)?;
    Ok(vec![csv_path, json_path])
}
