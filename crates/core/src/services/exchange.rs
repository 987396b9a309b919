use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::errors::CoreError;
use crate::models::config::Period;
use crate::models::series::TimeSeries;
use crate::providers::traits::QuoteProvider;
use super::calendar::{fill_missing_dates, fill_unit, today};

/// How long a fetched pair series stays fresh. Exchange rates move
/// slowly relative to a report run; staleness beyond this is accepted.
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

struct CachedSeries {
    fetched_at: Instant,
    series: TimeSeries,
}

/// Resolves daily exchange-rate series for currency pairs.
///
/// Identical currencies short-circuit to the constant-1.0 unit series —
/// no data source is hit, and the fixed 2015-through-today window
/// applies instead of a fetched range.
///
/// Results are cached per (from, to) pair behind a mutex; a race between
/// two lookups costs at worst a duplicate fetch, never corruption.
pub struct ExchangeRateService {
    provider: Arc<dyn QuoteProvider>,
    cache: Mutex<HashMap<(String, String), CachedSeries>>,
}

impl ExchangeRateService {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Daily series of units of `to` per unit of `from`, gap-filled
    /// through today.
    pub async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<TimeSeries, CoreError> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();

        if from == to {
            return Ok(fill_unit());
        }

        let key = (from.clone(), to.clone());
        if let Ok(cache) = self.cache.lock() {
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < CACHE_TTL {
                    return Ok(entry.series.clone());
                }
            }
        }

        // Yahoo quotes currency pairs under a synthetic "=X" symbol.
        let pair_symbol = format!("{from}{to}=X");
        let history = self
            .provider
            .history(&pair_symbol, Period::TenYears)
            .await?;
        let series = fill_missing_dates(&history, Some(today()));

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                key,
                CachedSeries {
                    fetched_at: Instant::now(),
                    series: series.clone(),
                },
            );
        }

        Ok(series)
    }

    /// Most recent rate for the pair (last finite value of the series).
    pub async fn get_latest_exchange_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<f64, CoreError> {
        self.get_exchange_rate(from, to)
            .await?
            .last_value()
            .ok_or_else(|| {
                CoreError::InvalidSeries(format!("no exchange rate data for {from}/{to}"))
            })
    }
}
