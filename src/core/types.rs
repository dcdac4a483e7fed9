//! Record, category and rating types shared by every pipeline stage

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::constants::{emissions, ratings};
use crate::core::error::CarbonEdaError;

/// Website category; drives the size range and fixed overhead of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Blog,
    ECommerce,
    News,
    Corporate,
    Portfolio,
    Streaming,
}

/// Sampling parameters of a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProfile {
    pub min_size_bytes: u64,
    pub max_size_bytes: u64,
    /// Fixed per-visit emissions independent of page weight (gCO2e)
    pub overhead_gco2e: f64,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Blog,
        Category::ECommerce,
        Category::News,
        Category::Corporate,
        Category::Portfolio,
        Category::Streaming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Blog => "blog",
            Category::ECommerce => "e-commerce",
            Category::News => "news",
            Category::Corporate => "corporate",
            Category::Portfolio => "portfolio",
            Category::Streaming => "streaming",
        }
    }

    pub fn profile(&self) -> CategoryProfile {
        let (min_mb, max_mb, overhead_gco2e) = match self {
            Category::Blog => (0.5, 1.5, 0.10),
            Category::Portfolio => (1.0, 2.5, 0.12),
            Category::Corporate => (1.5, 3.0, 0.15),
            Category::News => (2.0, 4.0, 0.20),
            Category::ECommerce => (2.5, 5.0, 0.25),
            Category::Streaming => (3.0, 6.0, 0.30),
        };
        CategoryProfile {
            min_size_bytes: (min_mb * emissions::BYTES_PER_MB) as u64,
            max_size_bytes: (max_mb * emissions::BYTES_PER_MB) as u64,
            overhead_gco2e,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CarbonEdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted || (wanted == "ecommerce" && *category == Category::ECommerce))
            .ok_or_else(|| {
                CarbonEdaError::Config(format!(
                    "Unknown category '{s}'. Expected one of: {}.",
                    Category::ALL.map(|c| c.as_str()).join(", ")
                ))
            })
    }
}

/// Ordinal carbon rating, A (lowest emissions) to F (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Rating {
    pub const ALL: [Rating; 6] = [Rating::A, Rating::B, Rating::C, Rating::D, Rating::E, Rating::F];

    /// Bucket an emissions value against the fixed cut points
    pub fn from_emissions(gco2e: f64) -> Rating {
        let index = ratings::CUT_POINTS
            .iter()
            .position(|&cut| gco2e < cut)
            .unwrap_or(ratings::CUT_POINTS.len());
        Rating::ALL[index]
    }

    /// 1 for A through 6 for F
    pub fn ordinal(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::E => "E",
            Rating::F => "F",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One website row of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub url: String,
    pub size_bytes: u64,
    pub is_green: bool,
    pub category: Category,
    pub emissions_gco2e: f64,
    pub rating: Rating,
}

impl Record {
    pub fn new(url: String, size_bytes: u64, is_green: bool, category: Category, emissions_gco2e: f64) -> Self {
        Self {
            url,
            size_bytes,
            is_green,
            category,
            emissions_gco2e,
            rating: Rating::from_emissions(emissions_gco2e),
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / emissions::BYTES_PER_MB
    }

    /// Check the per-record invariants
    pub fn validate(&self) -> Result<(), CarbonEdaError> {
        if self.size_bytes == 0 {
            return Err(CarbonEdaError::Validation(format!(
                "Record '{}' has a size of 0 bytes. Expected a positive size.",
                self.url
            )));
        }
        if !(self.emissions_gco2e.is_finite() && self.emissions_gco2e > 0.0) {
            return Err(CarbonEdaError::Validation(format!(
                "Record '{}' has emissions of {}. Expected a positive finite value.",
                self.url, self.emissions_gco2e
            )));
        }
        Ok(())
    }
}

/// Immutable table of records produced once per run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn emissions(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.emissions_gco2e).collect()
    }

    /// Emissions of the green (`true`) or non-green (`false`) records
    pub fn emissions_by_hosting(&self, green: bool) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.is_green == green)
            .map(|r| r.emissions_gco2e)
            .collect()
    }

    pub fn green_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_green).count()
    }

    /// Share of green-hosted records; 0 for an empty table
    pub fn green_share(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            self.green_count() as f64 / self.records.len() as f64
        }
    }

    /// Records grouped by category, in category order
    pub fn by_category(&self) -> BTreeMap<Category, Vec<&Record>> {
        let mut groups: BTreeMap<Category, Vec<&Record>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.category).or_default().push(record);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    fn record(category: Category, is_green: bool, emissions: f64) -> Record {
        Record::new("https://a.example".to_string(), 1_000_000, is_green, category, emissions)
    }

    #[test]
    fn test_rating__from_emissions_boundaries() {
        assert_eq!(Rating::from_emissions(0.01), Rating::A);
        assert_eq!(Rating::from_emissions(0.3999), Rating::A);
        assert_eq!(Rating::from_emissions(0.40), Rating::B);
        assert_eq!(Rating::from_emissions(0.99), Rating::C);
        assert_eq!(Rating::from_emissions(1.00), Rating::D);
        assert_eq!(Rating::from_emissions(1.75), Rating::E);
        assert_eq!(Rating::from_emissions(2.00), Rating::F);
        assert_eq!(Rating::from_emissions(250.0), Rating::F);
    }

    #[test]
    fn test_rating__ordinal_and_order() {
        assert_eq!(Rating::A.ordinal(), 1);
        assert_eq!(Rating::F.ordinal(), 6);
        assert!(Rating::A < Rating::F);
    }

    #[test]
    fn test_category__from_str() {
        assert_eq!("blog".parse::<Category>().unwrap(), Category::Blog);
        assert_eq!(" E-Commerce ".parse::<Category>().unwrap(), Category::ECommerce);
        assert_eq!("ecommerce".parse::<Category>().unwrap(), Category::ECommerce);
        let err = "casino".parse::<Category>().unwrap_err();
        assert!(format!("{err}").contains("Unknown category 'casino'"));
    }

    #[test]
    fn test_category__profiles_are_valid_ranges() {
        for category in Category::ALL {
            let profile = category.profile();
            assert!(profile.min_size_bytes > 0);
            assert!(profile.min_size_bytes < profile.max_size_bytes);
            assert!(profile.overhead_gco2e > 0.0);
        }
    }

    #[test]
    fn test_category__serde_names() {
        let json = serde_json::to_string(&Category::ECommerce).unwrap();
        assert_eq!(json, "\"e-commerce\"");
        let back: Category = serde_json::from_str("\"streaming\"").unwrap();
        assert_eq!(back, Category::Streaming);
    }

    #[test]
    fn test_record__validate() {
        assert!(record(Category::Blog, true, 0.5).validate().is_ok());
        assert!(record(Category::Blog, true, 0.0).validate().is_err());
        assert!(record(Category::Blog, true, f64::NAN).validate().is_err());

        let mut empty = record(Category::Blog, false, 0.5);
        empty.size_bytes = 0;
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_dataset__partitions() {
        let dataset = Dataset::new(vec![
            record(Category::News, true, 0.5),
            record(Category::Blog, false, 0.9),
            record(Category::News, false, 1.1),
        ]);

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.emissions_by_hosting(true), vec![0.5]);
        assert_eq!(dataset.emissions_by_hosting(false), vec![0.9, 1.1]);
        assert!((dataset.green_share() - 1.0 / 3.0).abs() < 1e-12);

        let groups = dataset.by_category();
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![Category::Blog, Category::News]);
        assert_eq!(groups[&Category::News].len(), 2);
    }

    #[test]
    fn test_dataset__empty() {
        let dataset = Dataset::default();
        assert!(dataset.is_empty());
        assert_eq!(dataset.green_share(), 0.0);
    }
}
