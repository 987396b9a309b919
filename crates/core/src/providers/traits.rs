use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::config::Period;
use crate::models::series::TimeSeries;
use crate::models::ticker::TickerProfile;

/// Trait abstraction over the market-data source.
///
/// The pipeline only ever talks to this trait; the Yahoo implementation
/// can be swapped for another source (or a test mock) without touching
/// the services.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Daily close history for `symbol` over the lookback window,
    /// adjusted for splits and dividends. Trading days only — the
    /// calendar filler turns this into a gapless daily series.
    async fn history(&self, symbol: &str, period: Period) -> Result<TimeSeries, CoreError>;

    /// Latest available close price.
    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError>;

    /// Descriptive and fundamental data for the instrument.
    async fn profile(&self, symbol: &str) -> Result<TickerProfile, CoreError>;

    /// Dividend payment events within the lookback window.
    async fn dividends(&self, symbol: &str, period: Period) -> Result<TimeSeries, CoreError>;
}

/// One annual inflation observation: percent change for `year`,
/// expressed as a fraction (0.02 = 2%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualRate {
    pub year: i32,
    pub rate: f64,
}

/// Trait abstraction over the inflation statistics source.
#[async_trait]
pub trait InflationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Annual CPI percent-change observations for an ISO2 country code,
    /// unordered and possibly sparse. Years without data are omitted.
    async fn annual_rates(&self, country_iso2: &str) -> Result<Vec<AnnualRate>, CoreError>;
}
