use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::config::Period;
use crate::models::series::{SeriesPoint, TimeSeries};
use crate::models::ticker::{PriceTargets, RecommendationCounts, TickerProfile};
use super::traits::QuoteProvider;

const PROVIDER: &str = "Yahoo Finance";
const SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_MODULES: &str =
    "price,assetProfile,summaryDetail,financialData,recommendationTrend,defaultKeyStatistics,earningsTrend";

/// Yahoo Finance quote provider.
///
/// - **Free**: no API key (unofficial public API).
/// - **Coverage**: global equities, ETFs, indices, and the synthetic
///   currency-pair symbols (`EURUSD=X`) the exchange-rate service uses.
///
/// Close histories go through the `yahoo_finance_api` crate; the profile
/// and dividend-event lookups hit the quoteSummary/chart JSON endpoints
/// directly, since the crate does not expose them.
pub struct YahooQuoteProvider {
    connector: yahoo_finance_api::YahooConnector,
    client: Client,
}

impl YahooQuoteProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self {
            connector,
            client: Client::new(),
        })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let month: time::Month = match date.month() {
            1 => time::Month::January,
            2 => time::Month::February,
            3 => time::Month::March,
            4 => time::Month::April,
            5 => time::Month::May,
            6 => time::Month::June,
            7 => time::Month::July,
            8 => time::Month::August,
            9 => time::Month::September,
            10 => time::Month::October,
            11 => time::Month::November,
            12 => time::Month::December,
            _ => unreachable!(),
        };

        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Invalid date {date}: {e}"),
            })?
            .with_hms(0, 0, 0)
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Invalid time for {date}: {e}"),
            })?
            .assume_utc();
        Ok(odt)
    }

    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

// ── quoteSummary response types ─────────────────────────────────────

/// Yahoo wraps most numeric fields as `{raw, fmt}` objects.
#[derive(Deserialize, Default)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn get(opt: &Option<RawValue>) -> Option<f64> {
        opt.as_ref().and_then(|v| v.raw)
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    quote_type: Option<String>,
    symbol: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AssetProfileModule {
    sector: Option<String>,
    country: Option<String>,
    full_time_employees: Option<u64>,
    overall_risk: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    previous_close: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    dividend_rate: Option<RawValue>,
    five_year_avg_dividend_yield: Option<RawValue>,
    beta: Option<RawValue>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    target_high_price: Option<RawValue>,
    target_low_price: Option<RawValue>,
    target_mean_price: Option<RawValue>,
    target_median_price: Option<RawValue>,
    operating_cashflow: Option<RawValue>,
    free_cashflow: Option<RawValue>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    enterprise_value: Option<RawValue>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RecommendationEntry {
    #[serde(default)]
    strong_buy: u32,
    #[serde(default)]
    buy: u32,
    #[serde(default)]
    hold: u32,
    #[serde(default)]
    sell: u32,
    #[serde(default)]
    strong_sell: u32,
}

#[derive(Deserialize, Default)]
struct RecommendationTrendModule {
    #[serde(default)]
    trend: Vec<RecommendationEntry>,
}

#[derive(Deserialize, Default)]
struct EarningsTrendEntry {
    #[serde(default)]
    period: String,
    growth: Option<RawValue>,
}

#[derive(Deserialize, Default)]
struct EarningsTrendModule {
    #[serde(default)]
    trend: Vec<EarningsTrendEntry>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    price: Option<PriceModule>,
    asset_profile: Option<AssetProfileModule>,
    summary_detail: Option<SummaryDetailModule>,
    financial_data: Option<FinancialDataModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    recommendation_trend: Option<RecommendationTrendModule>,
    earnings_trend: Option<EarningsTrendModule>,
}

#[derive(Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Vec<SummaryResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryBody,
}

// ── chart (dividend events) response types ──────────────────────────

#[derive(Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Deserialize, Default)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
}

#[derive(Deserialize)]
struct ChartResult {
    events: Option<ChartEvents>,
}

#[derive(Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Vec<ChartResult>,
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn history(&self, symbol: &str, period: Period) -> Result<TimeSeries, CoreError> {
        let today = Utc::now().date_naive();
        let start = Self::to_offset_datetime(today - Duration::days(period.num_days()))?;
        let end = Self::to_offset_datetime(today + Duration::days(1))?;

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch history for {symbol}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        // adjclose is back-adjusted for splits and dividends, matching
        // the "adjusted performance" framing of the whole report.
        let points: Vec<SeriesPoint> = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp as i64)?;
                Some(SeriesPoint {
                    date,
                    value: q.adjclose,
                })
            })
            .collect();

        Ok(TimeSeries::from_points(points))
    }

    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        Ok(quote.close)
    }

    async fn profile(&self, symbol: &str) -> Result<TickerProfile, CoreError> {
        let url = format!("{SUMMARY_URL}/{symbol}");

        let resp: QuoteSummaryResponse = self
            .client
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse summary for {symbol}: {e}"),
            })?;

        let result = resp
            .quote_summary
            .result
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::TickerNotFound(symbol.to_string()))?;

        let price = result.price.unwrap_or_default();
        let asset = result.asset_profile.unwrap_or_default();
        let detail = result.summary_detail.unwrap_or_default();
        let financial = result.financial_data.unwrap_or_default();
        let stats = result.default_key_statistics.unwrap_or_default();

        let recommendations = result
            .recommendation_trend
            .and_then(|m| m.trend.into_iter().next())
            .map(|t| RecommendationCounts {
                strong_buy: t.strong_buy,
                buy: t.buy,
                hold: t.hold,
                sell: t.sell,
                strong_sell: t.strong_sell,
            })
            .unwrap_or_default();

        let growth_estimate = result
            .earnings_trend
            .and_then(|m| m.trend.into_iter().find(|t| t.period == "+1y"))
            .and_then(|t| t.growth.and_then(|g| g.raw));

        Ok(TickerProfile {
            symbol: price.symbol.unwrap_or_else(|| symbol.to_string()),
            currency: price.currency.unwrap_or_else(|| "USD".to_string()),
            long_name: price
                .long_name
                .or(price.short_name)
                .unwrap_or_default(),
            quote_type: price.quote_type.unwrap_or_else(|| "EQUITY".to_string()),
            sector: asset.sector.unwrap_or_default(),
            country: asset.country.unwrap_or_default(),
            previous_close: RawValue::get(&detail.previous_close),
            dividend_yield: RawValue::get(&detail.dividend_yield),
            dividend_rate: RawValue::get(&detail.dividend_rate),
            five_year_avg_dividend_yield: RawValue::get(&detail.five_year_avg_dividend_yield),
            beta: RawValue::get(&detail.beta),
            enterprise_value: RawValue::get(&stats.enterprise_value),
            operating_cashflow: RawValue::get(&financial.operating_cashflow),
            free_cashflow: RawValue::get(&financial.free_cashflow),
            full_time_employees: asset.full_time_employees,
            overall_risk: asset.overall_risk,
            growth_estimate,
            price_targets: PriceTargets {
                high: RawValue::get(&financial.target_high_price),
                low: RawValue::get(&financial.target_low_price),
                mean: RawValue::get(&financial.target_mean_price),
                median: RawValue::get(&financial.target_median_price),
            },
            recommendations,
        })
    }

    async fn dividends(&self, symbol: &str, period: Period) -> Result<TimeSeries, CoreError> {
        let url = format!("{CHART_URL}/{symbol}");

        let resp: ChartResponse = self
            .client
            .get(&url)
            .query(&[
                ("range", period.as_str()),
                ("interval", "1d"),
                ("events", "div"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse dividend events for {symbol}: {e}"),
            })?;

        let events = resp
            .chart
            .result
            .into_iter()
            .next()
            .and_then(|r| r.events)
            .unwrap_or_default();

        let points: Vec<SeriesPoint> = events
            .dividends
            .values()
            .filter_map(|d| {
                let date = Self::timestamp_to_naive_date(d.date)?;
                Some(SeriesPoint {
                    date,
                    value: d.amount,
                })
            })
            .collect();

        Ok(TimeSeries::from_points(points))
    }
}
