// ═══════════════════════════════════════════════════════════════════
// Service Tests — calendar filler, inflation index, exchange rates,
// ticker resolution (all against mock providers)
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use performance_report_core::errors::CoreError;
use performance_report_core::models::config::Period;
use performance_report_core::models::series::{SeriesPoint, TimeSeries};
use performance_report_core::models::ticker::TickerProfile;
use performance_report_core::providers::traits::{AnnualRate, InflationProvider, QuoteProvider};
use performance_report_core::services::calendar::{
    fill_missing_dates, fill_unit, today, unit_series_start,
};
use performance_report_core::services::exchange::ExchangeRateService;
use performance_report_core::services::inflation::InflationService;
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

// ═══════════════════════════════════════════════════════════════════
// Mock Quote Provider (counts history fetches)
// ═══════════════════════════════════════════════════════════════════

struct MockQuoteProvider {
    histories: HashMap<String, TimeSeries>,
    history_calls: AtomicUsize,
}

impl MockQuoteProvider {
    fn new(histories: HashMap<String, TimeSeries>) -> Self {
        Self {
            histories,
            history_calls: AtomicUsize::new(0),
        }
    }

    fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "MockProvider"
    }

    async fn history(&self, symbol: &str, _period: Period) -> Result<TimeSeries, CoreError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| CoreError::TickerNotFound(symbol.into()))
    }

    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError> {
        self.histories
            .get(symbol)
            .and_then(|s| s.last_value())
            .ok_or_else(|| CoreError::TickerNotFound(symbol.into()))
    }

    async fn profile(&self, symbol: &str) -> Result<TickerProfile, CoreError> {
        if !self.histories.contains_key(symbol) {
            return Err(CoreError::TickerNotFound(symbol.into()));
        }
        Ok(TickerProfile {
            symbol: symbol.to_string(),
            currency: "EUR".to_string(),
            previous_close: self.histories.get(symbol).and_then(|s| s.last_value()),
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

struct FailingInflationProvider;

#[async_trait]
impl InflationProvider for FailingInflationProvider {
    fn name(&self) -> &str {
        "MockStats"
    }

    async fn annual_rates(&self, _country_iso2: &str) -> Result<Vec<AnnualRate>, CoreError> {
        Err(CoreError::Network("request timed out".into()))
    }
}

// ── Calendar filler ─────────────────────────────────────────────────

mod calendar {
    use super::*;

    #[test]
    fn gap_is_forward_filled() {
        let sparse = series(&[(2026, 1, 1, 1.0), (2026, 1, 3, 3.0)]);
        let filled = fill_missing_dates(&sparse, None);

        assert_eq!(filled.len(), 3);
        assert!(filled.is_daily());
        assert_eq!(filled.get(date(2026, 1, 2)), Some(1.0));
        assert_eq!(filled.get(date(2026, 1, 3)), Some(3.0));
    }

    #[test]
    fn extends_to_until_with_last_value() {
        let sparse = series(&[(2026, 1, 1, 1.0), (2026, 1, 3, 3.0)]);
        let filled = fill_missing_dates(&sparse, Some(date(2026, 1, 5)));

        assert_eq!(filled.len(), 5);
        assert_eq!(filled.get(date(2026, 1, 5)), Some(3.0));
    }

    #[test]
    fn leading_gap_stays_nan() {
        let sparse = series(&[(2026, 1, 1, f64::NAN), (2026, 1, 3, 3.0)]);
        let filled = fill_missing_dates(&sparse, None);

        assert!(filled.get(date(2026, 1, 1)).unwrap().is_nan());
        assert!(filled.get(date(2026, 1, 2)).unwrap().is_nan());
        assert_eq!(filled.get(date(2026, 1, 3)), Some(3.0));
    }

    #[test]
    fn empty_series_passes_through() {
        let empty = TimeSeries::new();
        let filled = fill_missing_dates(&empty, Some(date(2026, 1, 5)));
        assert!(filled.is_empty());
    }

    #[test]
    fn until_before_start_passes_through() {
        let sparse = series(&[(2026, 1, 10, 1.0), (2026, 1, 12, 2.0)]);
        let filled = fill_missing_dates(&sparse, Some(date(2026, 1, 1)));
        assert_eq!(filled, sparse);
    }

    #[test]
    fn unit_series_covers_fixed_window() {
        let unit = fill_unit();
        assert_eq!(unit.first_date(), Some(unit_series_start()));
        assert_eq!(unit.last_date(), Some(today()));
        assert!(unit.is_daily());
        assert!(unit.iter().all(|p| p.value == 1.0));
    }
}

// ── Inflation index ─────────────────────────────────────────────────

mod inflation {
    use super::*;

    fn service(rates: Vec<AnnualRate>) -> InflationService {
        InflationService::new(Arc::new(MockInflationProvider { rates }))
    }

    #[tokio::test]
    async fn annual_rates_compound_at_year_boundaries() {
        let svc = service(vec![
            AnnualRate { year: 2015, rate: 0.02 },
            AnnualRate { year: 2016, rate: 0.015 },
        ]);
        let index = svc.get_inflation_rate("DEU").await.unwrap();

        assert_eq!(index.get(date(2015, 1, 1)), Some(1.0));
        let end_2015 = index.get(date(2016, 1, 1)).unwrap();
        assert!((end_2015 - 1.02).abs() < 1e-12);
        let end_2016 = index.get(date(2017, 1, 1)).unwrap();
        assert!((end_2016 - 1.02 * 1.015).abs() < 1e-12);
    }

    #[tokio::test]
    async fn interpolation_is_smooth_and_monotone_under_inflation() {
        let svc = service(vec![AnnualRate { year: 2015, rate: 0.02 }]);
        let index = svc.get_inflation_rate("DEU").await.unwrap();

        let mid = index.get(date(2015, 7, 2)).unwrap();
        assert!(mid > 1.0 && mid < 1.02);

        // Log-linear interpolation: halfway through the year the index
        // is close to the geometric mean of the endpoints.
        let geometric_mid = 1.02_f64.sqrt();
        assert!((mid - geometric_mid).abs() < 1e-3);
    }

    #[tokio::test]
    async fn rates_before_2015_are_ignored() {
        let svc = service(vec![
            AnnualRate { year: 2013, rate: 0.5 },
            AnnualRate { year: 2014, rate: 0.5 },
            AnnualRate { year: 2015, rate: 0.02 },
        ]);
        let index = svc.get_inflation_rate("DEU").await.unwrap();
        assert!((index.get(date(2016, 1, 1)).unwrap() - 1.02).abs() < 1e-12);
    }

    #[tokio::test]
    async fn empty_country_is_identity() {
        let svc = service(vec![AnnualRate { year: 2015, rate: 0.02 }]);
        let index = svc.get_inflation_rate("").await.unwrap();
        assert!(index.iter().all(|p| p.value == 1.0));
    }

    #[tokio::test]
    async fn no_usable_rates_is_invalid_series() {
        let svc = service(vec![AnnualRate { year: 2010, rate: 0.02 }]);
        let err = svc.get_inflation_rate("DEU").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidSeries(_)));
    }

    #[tokio::test]
    async fn provider_timeout_propagates_as_network_error() {
        let svc = InflationService::new(Arc::new(FailingInflationProvider));
        let err = svc.get_inflation_rate("DEU").await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
    }
}

// ── Exchange rates ──────────────────────────────────────────────────

mod exchange {
    use super::*;

    fn provider_with_pair() -> Arc<MockQuoteProvider> {
        let mut histories = HashMap::new();
        histories.insert(
            "USDEUR=X".to_string(),
            series(&[(2026, 1, 1, 0.9), (2026, 1, 3, 0.92)]),
        );
        Arc::new(MockQuoteProvider::new(histories))
    }

    #[tokio::test]
    async fn identity_pair_is_unit_series_without_fetch() {
        let provider = provider_with_pair();
        let svc = ExchangeRateService::new(provider.clone());

        let rate = svc.get_exchange_rate("EUR", "eur").await.unwrap();
        assert!(rate.iter().all(|p| p.value == 1.0));
        assert_eq!(rate.first_date(), Some(unit_series_start()));
        assert_eq!(provider.history_calls(), 0);
    }

    #[tokio::test]
    async fn pair_series_is_gap_filled_through_today() {
        let svc = ExchangeRateService::new(provider_with_pair());
        let rate = svc.get_exchange_rate("USD", "EUR").await.unwrap();

        assert_eq!(rate.get(date(2026, 1, 2)), Some(0.9));
        assert_eq!(rate.last_date(), Some(today()));
        assert_eq!(rate.last_value(), Some(0.92));
    }

    #[tokio::test]
    async fn repeated_lookup_hits_cache() {
        let provider = provider_with_pair();
        let svc = ExchangeRateService::new(provider.clone());

        svc.get_exchange_rate("USD", "EUR").await.unwrap();
        svc.get_exchange_rate("usd", "eur").await.unwrap();

        assert_eq!(provider.history_calls(), 1);
    }

    #[tokio::test]
    async fn latest_rate_is_last_finite_value() {
        let svc = ExchangeRateService::new(provider_with_pair());
        let latest = svc.get_latest_exchange_rate("USD", "EUR").await.unwrap();
        assert_eq!(latest, 0.92);
    }

    #[tokio::test]
    async fn unknown_pair_is_an_error() {
        let svc = ExchangeRateService::new(provider_with_pair());
        let err = svc.get_exchange_rate("GBP", "JPY").await.unwrap_err();
        assert!(matches!(err, CoreError::TickerNotFound(_)));
    }
}

// ── Ticker resolution ───────────────────────────────────────────────

mod tickers {
    use super::*;

    fn provider_with_symbol() -> Arc<MockQuoteProvider> {
        let mut histories = HashMap::new();
        histories.insert(
            "SAP.DE".to_string(),
            series(&[(2026, 1, 1, 170.0), (2026, 1, 2, 171.5)]),
        );
        Arc::new(MockQuoteProvider::new(histories))
    }

    #[tokio::test]
    async fn resolution_is_memoized_per_symbol_and_period() {
        let provider = provider_with_symbol();
        let svc = TickerService::new(provider.clone());

        let first = svc.resolve("SAP.DE", Period::OneYear).await.unwrap();
        let second = svc.resolve("sap.de", Period::OneYear).await.unwrap();

        assert_eq!(provider.history_calls(), 1);
        assert_eq!(first.symbol(), second.symbol());
        assert_eq!(svc.cached_count(), 1);
    }

    #[tokio::test]
    async fn different_periods_resolve_separately() {
        let provider = provider_with_symbol();
        let svc = TickerService::new(provider.clone());

        svc.resolve("SAP.DE", Period::OneYear).await.unwrap();
        svc.resolve("SAP.DE", Period::FiveYears).await.unwrap();

        assert_eq!(provider.history_calls(), 2);
        assert_eq!(svc.cached_count(), 2);
    }

    #[tokio::test]
    async fn empty_symbol_is_rejected() {
        let svc = TickerService::new(provider_with_symbol());
        let err = svc.resolve("  ", Period::OneYear).await.unwrap_err();
        assert!(matches!(err, CoreError::TickerNotFound(_)));
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let provider = provider_with_symbol();
        let svc = TickerService::new(provider.clone());

        svc.resolve("SAP.DE", Period::OneYear).await.unwrap();
        svc.clear();
        assert_eq!(svc.cached_count(), 0);

        svc.resolve("SAP.DE", Period::OneYear).await.unwrap();
        assert_eq!(provider.history_calls(), 2);
    }
}
