//! Record sources
//!
//! This module produces the dataset the analyzer consumes: the seeded
//! synthesizer, a CSV loader for previously exported tables, and the
//! Website Carbon API client.

pub mod api;
pub mod generator;
pub mod source;

// Re-export commonly used items
pub use api::CarbonApiSource;
pub use generator::{SynthesisConfig, emission_model, generate_dataset, hosting_split_within};
pub use source::{ApiTarget, CsvSource, RecordSource, SourceKind, SyntheticSource};
