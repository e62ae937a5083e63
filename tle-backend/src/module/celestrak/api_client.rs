//! CelesTrak GP client for group TLE downloads (no authentication)
use anyhow::{Context, Result};
use std::time::Duration;
use tle_common::TleRecord;

use crate::module::tle::extract_from_text;

pub const DEFAULT_BASE_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";
const USER_AGENT: &str = "tle-backend/0.1";

/// Major debris clouds and other historical breakups
pub const DEFAULT_DEBRIS_GROUPS: &[&str] = &[
    "iridium-33-debris",
    "cosmos-2251-debris",
    "fengyun-1c-debris",
    "cosmos-1408-debris",
    "2012-044-debris",
];

pub struct CelestrakClient {
    client: reqwest::Client,
    base_url: String,
}

impl CelestrakClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Raw TLE text for one group (`GROUP=<group>&FORMAT=tle`)
    pub async fn fetch_group_text(&self, group: &str) -> Result<String> {
        tracing::debug!("Fetching CelesTrak group {} from {}", group, self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("GROUP", group), ("FORMAT", "tle")])
            .send()
            .await
            .context(format!("Failed to send request for group {}", group))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP error {} for group {}",
                response.status(),
                group
            ));
        }

        response
            .text()
            .await
            .context(format!("Failed to read response body for group {}", group))
    }

    /// Fetch one group and extract its triplets
    pub async fn fetch_group(&self, group: &str) -> Result<Vec<TleRecord>> {
        let text = self.fetch_group_text(group).await?;
        let records = extract_from_text(&text, group);

        tracing::debug!("Extracted {} records for group {}", records.len(), group);
        if records.is_empty() && !text.trim().is_empty() {
            tracing::warn!(
                "Group {} returned {} bytes but no TLE triplets: {:?}",
                group,
                text.len(),
                text.lines().next().unwrap_or_default()
            );
        }

        Ok(records)
    }
}
