// ═══════════════════════════════════════════════════════════════════
// Pipeline Tests — series joining, rebasing, range utility, and
// portfolio valuation against mock providers
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use performance_report_core::errors::CoreError;
use performance_report_core::models::config::{Period, ReportConfig};
use performance_report_core::models::portfolio::{Portfolio, PortfolioRow};
use performance_report_core::models::series::{SeriesPoint, TimeSeries};
use performance_report_core::models::ticker::{ResolvedTicker, TickerProfile};
use performance_report_core::providers::traits::{AnnualRate, InflationProvider, QuoteProvider};
use performance_report_core::services::exchange::ExchangeRateService;
use performance_report_core::services::inflation::InflationService;
use performance_report_core::services::join::{join_all, total_minmax};
use performance_report_core::services::overview::build_overview;
use performance_report_core::services::tickers::TickerService;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn series(points: &[(i32, u32, u32, f64)]) -> TimeSeries {
    TimeSeries::from_points(
        points
            .iter()
            .map(|&(y, m, d, value)| SeriesPoint {
                date: date(y, m, d),
                value,
            })
            .collect(),
    )
}

fn resolved(symbol: &str, currency: &str, history: TimeSeries) -> ResolvedTicker {
    let previous_close = history.last_value();
    ResolvedTicker {
        profile: TickerProfile {
            symbol: symbol.to_string(),
            currency: currency.to_string(),
            previous_close,
            ..Default::default()
        },
        history,
        dividends: TimeSeries::new(),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

struct MockQuoteProvider {
    histories: HashMap<String, TimeSeries>,
    closes: HashMap<String, f64>,
}

impl MockQuoteProvider {
    fn new() -> Self {
        Self {
            histories: HashMap::new(),
            closes: HashMap::new(),
        }
    }

    fn with_history(mut self, symbol: &str, history: TimeSeries) -> Self {
        self.histories.insert(symbol.to_string(), history);
        self
    }

    fn with_close(mut self, symbol: &str, close: f64) -> Self {
        self.closes.insert(symbol.to_string(), close);
        self
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn history(&self, symbol: &str, _period: Period) -> Result<TimeSeries, CoreError> {
        self.histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| CoreError::TickerNotFound(symbol.into()))
    }

    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError> {
        self.closes
            .get(symbol)
            .copied()
            .ok_or_else(|| CoreError::TickerNotFound(symbol.into()))
    }

    async fn profile(&self, symbol: &str) -> Result<TickerProfile, CoreError> {
        let close = self
            .closes
            .get(symbol)
            .copied()
            .or_else(|| self.histories.get(symbol).and_then(|s| s.last_value()));
        if close.is_none() && !self.histories.contains_key(symbol) {
            return Err(CoreError::TickerNotFound(symbol.into()));
        }
        Ok(TickerProfile {
            symbol: symbol.to_string(),
            currency: "EUR".to_string(),
            previous_close: close,
            ..Default::default()
        })
    }

    async fn dividends(&self, _symbol: &str, _period: Period) -> Result<TimeSeries, CoreError> {
        Ok(TimeSeries::new())
    }
}

struct MockInflationProvider {
    rates: Vec<AnnualRate>,
}

#[async_trait]
impl InflationProvider for MockInflationProvider {
    fn name(&self) -> &str {
        "MockStats"
    }

    async fn annual_rates(&self, _country_iso2: &str) -> Result<Vec<AnnualRate>, CoreError> {
        Ok(self.rates.clone())
    }
}

fn services(provider: MockQuoteProvider) -> (ExchangeRateService, InflationService) {
    let quotes: Arc<dyn QuoteProvider> = Arc::new(provider);
    let exchange = ExchangeRateService::new(Arc::clone(&quotes));
    let inflation = InflationService::new(Arc::new(MockInflationProvider {
        rates: vec![AnnualRate {
            year: 2015,
            rate: 0.02,
        }],
    }));
    (exchange, inflation)
}

/// Config with no inflation adjustment, so the identity index covers
/// any asset date range.
fn config() -> ReportConfig {
    ReportConfig {
        currency: "EUR".to_string(),
        country: String::new(),
        period: Period::OneYear,
        comparison_ticker: "EUNL.DE".to_string(),
    }
}

// ── Joiner ──────────────────────────────────────────────────────────

mod join {
    use super::*;

    #[tokio::test]
    async fn both_adjusted_columns_start_at_exactly_100() {
        let (exchange, inflation) = services(MockQuoteProvider::new());
        let asset = resolved(
            "SAP.DE",
            "EUR",
            series(&[(2026, 1, 2, 170.0), (2026, 1, 5, 187.0)]),
        );
        let comparison = resolved(
            "EUNL.DE",
            "EUR",
            series(&[(2026, 1, 2, 100.0), (2026, 1, 5, 101.0)]),
        );

        let table = join_all(&exchange, &inflation, &config(), &asset, &comparison)
            .await
            .unwrap();

        assert_eq!(table.close_adjusted[0], 100.0);
        assert_eq!(table.close_comparison_adjusted[0], 100.0);
        // 187 / 170 * 100, carried forward through today.
        let last = table.close_adjusted.last().copied().unwrap();
        assert!((last - 110.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn calendar_runs_from_asset_start_through_today() {
        let (exchange, inflation) = services(MockQuoteProvider::new());
        let asset = resolved(
            "SAP.DE",
            "EUR",
            series(&[(2026, 1, 2, 170.0), (2026, 1, 5, 187.0)]),
        );
        let comparison = resolved("EUNL.DE", "EUR", series(&[(2026, 1, 2, 100.0)]));

        let table = join_all(&exchange, &inflation, &config(), &asset, &comparison)
            .await
            .unwrap();

        assert_eq!(table.start_date(), Some(date(2026, 1, 2)));
        // Gapless daily calendar: one row per day.
        let span = (table.end_date().unwrap() - table.start_date().unwrap()).num_days() + 1;
        assert_eq!(span as usize, table.len());
        // Weekend-style gap forward-filled in the raw close.
        assert_eq!(table.close[1], 170.0);
    }

    #[tokio::test]
    async fn currency_conversion_multiplies_before_rebasing() {
        let provider = MockQuoteProvider::new().with_history(
            "USDEUR=X",
            series(&[(2026, 1, 1, 0.8), (2026, 1, 10, 0.8)]),
        );
        let (exchange, inflation) = services(provider);

        let asset = resolved(
            "AAPL",
            "USD",
            series(&[(2026, 1, 2, 200.0), (2026, 1, 5, 250.0)]),
        );
        let comparison = resolved("EUNL.DE", "EUR", series(&[(2026, 1, 2, 100.0)]));

        let table = join_all(&exchange, &inflation, &config(), &asset, &comparison)
            .await
            .unwrap();

        // Constant rate: the rebased column is unaffected by the level.
        assert_eq!(table.close_adjusted[0], 100.0);
        assert!((table.close_adjusted[3] - 125.0).abs() < 1e-9);
        // The raw close stays in the asset's own currency.
        assert_eq!(table.close[0], 200.0);
    }

    #[tokio::test]
    async fn shorter_comparison_coverage_rebases_at_its_own_start() {
        let (exchange, inflation) = services(MockQuoteProvider::new());
        let asset = resolved(
            "SAP.DE",
            "EUR",
            series(&[(2026, 1, 1, 100.0), (2026, 1, 10, 110.0)]),
        );
        // Benchmark data starts nine days later.
        let comparison = resolved(
            "EUNL.DE",
            "EUR",
            series(&[(2026, 1, 10, 50.0), (2026, 1, 11, 51.0)]),
        );

        let table = join_all(&exchange, &inflation, &config(), &asset, &comparison)
            .await
            .unwrap();

        assert!(table.close_comparison_adjusted[0].is_nan());
        assert_eq!(table.close_comparison_adjusted[9], 100.0);
    }

    #[tokio::test]
    async fn empty_asset_history_is_invalid_series() {
        let (exchange, inflation) = services(MockQuoteProvider::new());
        let asset = resolved("SAP.DE", "EUR", TimeSeries::new());
        let comparison = resolved("EUNL.DE", "EUR", series(&[(2026, 1, 2, 100.0)]));

        let err = join_all(&exchange, &inflation, &config(), &asset, &comparison)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSeries(_)));
    }

    #[tokio::test]
    async fn zero_first_close_is_invalid_series() {
        let (exchange, inflation) = services(MockQuoteProvider::new());
        let asset = resolved(
            "SAP.DE",
            "EUR",
            series(&[(2026, 1, 2, 0.0), (2026, 1, 5, 187.0)]),
        );
        let comparison = resolved("EUNL.DE", "EUR", series(&[(2026, 1, 2, 100.0)]));

        let err = join_all(&exchange, &inflation, &config(), &asset, &comparison)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSeries(_)));
    }

    #[tokio::test]
    async fn identity_inflation_column_sits_at_100() {
        let (exchange, inflation) = services(MockQuoteProvider::new());
        let asset = resolved(
            "SAP.DE",
            "EUR",
            series(&[(2026, 1, 2, 170.0), (2026, 1, 5, 187.0)]),
        );
        let comparison = resolved("EUNL.DE", "EUR", series(&[(2026, 1, 2, 100.0)]));

        let table = join_all(&exchange, &inflation, &config(), &asset, &comparison)
            .await
            .unwrap();

        assert!(table
            .inflation_adjusted
            .iter()
            .all(|&v| (v - 100.0).abs() < 1e-9));
    }
}

// ── Range utility ───────────────────────────────────────────────────

mod minmax {
    use super::*;

    #[test]
    fn global_extremes_across_columns() {
        let a = [1.0, 5.0, 3.0];
        let b = [2.0, 9.0, 1.0];
        assert_eq!(total_minmax(&[&a, &b]), (1.0, 9.0));
    }

    #[test]
    fn nan_values_are_ignored() {
        let a = [f64::NAN, 5.0];
        let b = [2.0, f64::NAN];
        assert_eq!(total_minmax(&[&a, &b]), (2.0, 5.0));
    }

    #[test]
    fn all_nan_yields_infinite_sentinels() {
        let a = [f64::NAN];
        let (min, max) = total_minmax(&[&a]);
        assert_eq!(min, f64::INFINITY);
        assert_eq!(max, f64::NEG_INFINITY);
    }

    #[test]
    fn no_columns_yields_infinite_sentinels() {
        let (min, max) = total_minmax(&[]);
        assert_eq!(min, f64::INFINITY);
        assert_eq!(max, f64::NEG_INFINITY);
    }
}

// ── Portfolio valuation ─────────────────────────────────────────────

mod overview {
    use super::*;

    fn quote_provider() -> MockQuoteProvider {
        MockQuoteProvider::new()
            .with_history("AAA", series(&[(2026, 1, 2, 90.0), (2026, 1, 5, 100.0)]))
            .with_history("BBB", series(&[(2026, 1, 2, 280.0), (2026, 1, 5, 300.0)]))
    }

    #[tokio::test]
    async fn values_and_shares_follow_position_sizes() {
        let quotes: Arc<dyn QuoteProvider> = Arc::new(quote_provider());
        let tickers = TickerService::new(Arc::clone(&quotes));
        let exchange = ExchangeRateService::new(quotes);

        let portfolio = Portfolio::new(vec![
            PortfolioRow::new("AAA", 1.0),
            PortfolioRow::new("BBB", 1.0),
        ]);

        let overview = build_overview(&tickers, &exchange, &portfolio, &config())
            .await
            .unwrap();

        assert_eq!(overview.total_value, 400.0);
        assert_eq!(overview.entries[0].value, 100.0);
        assert_eq!(overview.entries[0].share, 0.25);
        assert_eq!(overview.entries[1].share, 0.75);
    }

    #[tokio::test]
    async fn empty_symbol_rows_keep_their_slot() {
        let quotes: Arc<dyn QuoteProvider> = Arc::new(quote_provider());
        let tickers = TickerService::new(Arc::clone(&quotes));
        let exchange = ExchangeRateService::new(quotes);

        let portfolio = Portfolio::new(vec![
            PortfolioRow::new("AAA", 1.0),
            PortfolioRow::default(),
            PortfolioRow::new("BBB", 1.0),
        ]);

        let overview = build_overview(&tickers, &exchange, &portfolio, &config())
            .await
            .unwrap();

        assert_eq!(overview.entries.len(), 3);
        assert_eq!(overview.entries[1].index, 1);
        assert_eq!(overview.entries[1].symbol, "");
        assert_eq!(overview.entries[1].value, 0.0);
        assert_eq!(overview.entries[1].share, 0.0);
    }

    #[tokio::test]
    async fn all_empty_portfolio_is_an_error() {
        let quotes: Arc<dyn QuoteProvider> = Arc::new(MockQuoteProvider::new());
        let tickers = TickerService::new(Arc::clone(&quotes));
        let exchange = ExchangeRateService::new(quotes);

        let portfolio = Portfolio::new(vec![PortfolioRow::default(), PortfolioRow::default()]);

        let err = build_overview(&tickers, &exchange, &portfolio, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyPortfolio));
    }

    #[tokio::test]
    async fn unresolvable_position_counts_as_zero() {
        let quotes: Arc<dyn QuoteProvider> = Arc::new(
            MockQuoteProvider::new()
                .with_history("AAA", series(&[(2026, 1, 5, 100.0)])),
        );
        let tickers = TickerService::new(Arc::clone(&quotes));
        let exchange = ExchangeRateService::new(quotes);

        let portfolio = Portfolio::new(vec![
            PortfolioRow::new("AAA", 2.0),
            PortfolioRow::new("GONE", 5.0),
        ]);

        let overview = build_overview(&tickers, &exchange, &portfolio, &config())
            .await
            .unwrap();

        assert_eq!(overview.total_value, 200.0);
        assert_eq!(overview.entries[1].value, 0.0);
        assert_eq!(overview.entries[0].share, 1.0);
    }
}
