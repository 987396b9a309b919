use serde::{Deserialize, Serialize};

use super::series::TimeSeries;

/// Analyst consensus price targets, as far as the quote source knows them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTargets {
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Current analyst recommendation counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCounts {
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl RecommendationCounts {
    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }
}

/// Descriptive and fundamental data for a quoted instrument.
///
/// Field coverage varies by instrument; anything the source does not
/// report stays `None`/empty and the report sections degrade gracefully.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerProfile {
    /// Ticker symbol as quoted (e.g. "SAP.DE").
    pub symbol: String,

    /// Trading currency of the instrument (ISO code, e.g. "EUR").
    pub currency: String,

    pub long_name: String,
    pub quote_type: String,
    pub sector: String,
    pub country: String,

    pub previous_close: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub five_year_avg_dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub operating_cashflow: Option<f64>,
    pub free_cashflow: Option<f64>,
    pub full_time_employees: Option<u64>,
    pub overall_risk: Option<u32>,
    /// Next-year earnings growth estimate as a fraction (0.12 = 12%).
    pub growth_estimate: Option<f64>,

    pub price_targets: PriceTargets,
    pub recommendations: RecommendationCounts,
}

/// A symbol resolved against the quote source: profile plus the series
/// the pipeline consumes. Resolution is memoized per symbol by the
/// ticker service, so holding clones of this is cheap enough.
#[derive(Debug, Clone)]
pub struct ResolvedTicker {
    pub profile: TickerProfile,

    /// Close history over the configured lookback, trading days only.
    /// The joiner expands this to a gapless daily calendar.
    pub history: TimeSeries,

    /// Dividend payment events (date → amount per share). Sparse.
    pub dividends: TimeSeries,
}

impl ResolvedTicker {
    pub fn symbol(&self) -> &str {
        &self.profile.symbol
    }

    pub fn currency(&self) -> &str {
        &self.profile.currency
    }
}
