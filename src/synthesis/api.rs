//! Live records from the Website Carbon API
//!
//! Targets are fetched one at a time; there is no retry or rate limiting.

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

use crate::core::error::{CarbonEdaError, Result};
use crate::core::types::{Dataset, Record};
use crate::synthesis::source::{ApiTarget, RecordSource};

#[derive(Debug, Deserialize)]
struct SiteResponse {
    /// `true`, `false` or the string "unknown"
    green: serde_json::Value,
    bytes: u64,
    statistics: SiteStatistics,
}

#[derive(Debug, Deserialize)]
struct SiteStatistics {
    co2: Co2Estimate,
}

#[derive(Debug, Deserialize)]
struct Co2Estimate {
    grid: Grams,
    renewable: Grams,
}

#[derive(Debug, Deserialize)]
struct Grams {
    grams: f64,
}

pub struct CarbonApiSource {
    client: reqwest::Client,
    base_url: String,
    targets: Vec<ApiTarget>,
}

impl CarbonApiSource {
    pub fn new(base_url: String, targets: Vec<ApiTarget>, timeout: Duration) -> Result<Self> {
        let user_agent = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            targets,
        })
    }

    fn endpoint(&self, target: &ApiTarget) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &format!("{}/site", self.base_url),
            &[("url", target.url.as_str())],
        )
        .map_err(|e| {
            CarbonEdaError::InvalidArgument(format!(
                "Could not build API URL from '{}': {}",
                self.base_url, e
            ))
        })
    }

    async fn fetch(&self, target: &ApiTarget) -> Result<Record> {
        let endpoint = self.endpoint(target)?;
        debug!("GET {endpoint}");

        let site: SiteResponse = self
            .client
            .get(endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let is_green = matches!(site.green, serde_json::Value::Bool(true));
        let emissions = if is_green {
            site.statistics.co2.renewable.grams
        } else {
            site.statistics.co2.grid.grams
        };

        let record = Record::new(
            target.url.clone(),
            site.bytes,
            is_green,
            target.category,
            emissions,
        );
        record.validate()?;
        Ok(record)
    }
}

#[async_trait]
impl RecordSource for CarbonApiSource {
    fn describe(&self) -> String {
        format!("website carbon api ({} sites)", self.targets.len())
    }

    async fn collect(&self) -> Result<Dataset> {
        let mut records = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            records.push(self.fetch(target).await?);
        }
        Ok(Dataset::new(records))
    }
}
