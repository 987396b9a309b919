use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use super::traits::{AnnualRate, InflationProvider};

const BASE_URL: &str = "https://api.worldbank.org/v2";
const INDICATOR: &str = "FP.CPI.TOTL.ZG";
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// World Bank open-data provider for annual CPI inflation.
///
/// - **Free**: no API key.
/// - **Endpoint**: `/country/{iso2}/indicator/FP.CPI.TOTL.ZG?format=json`
/// - **Payload**: a two-element JSON array `[metadata, records]`, each
///   record `{date: "YYYY", value: <percent or null>, ...}`.
///
/// A read timeout surfaces as `CoreError::Network`; the caller decides
/// whether that is fatal for the report run.
pub struct WorldBankProvider {
    client: Client,
}

impl WorldBankProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for WorldBankProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── World Bank API response types ───────────────────────────────────

#[derive(Deserialize)]
struct PageMetadata {
    #[serde(default)]
    total: u32,
}

#[derive(Deserialize)]
struct IndicatorRecord {
    date: String,
    value: Option<f64>,
}

#[async_trait]
impl InflationProvider for WorldBankProvider {
    fn name(&self) -> &str {
        "World Bank"
    }

    async fn annual_rates(&self, country_iso2: &str) -> Result<Vec<AnnualRate>, CoreError> {
        let url = format!("{BASE_URL}/country/{country_iso2}/indicator/{INDICATOR}");

        // The payload is a heterogeneous two-element array.
        let (meta, records): (PageMetadata, Option<Vec<IndicatorRecord>>) = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("per_page", "100")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "World Bank".into(),
                message: format!("Failed to parse inflation payload for {country_iso2}: {e}"),
            })?;

        let records = records.ok_or_else(|| CoreError::Api {
            provider: "World Bank".into(),
            message: format!(
                "No inflation records for {country_iso2} (total={})",
                meta.total
            ),
        })?;

        let rates = records
            .iter()
            .filter_map(|r| {
                let year: i32 = r.date.parse().ok()?;
                let percent = r.value?;
                Some(AnnualRate {
                    year,
                    rate: percent / 100.0,
                })
            })
            .collect();

        Ok(rates)
    }
}
