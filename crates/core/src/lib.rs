pub mod errors;
pub mod models;
pub mod providers;
pub mod report;
pub mod services;
pub mod util;
pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use errors::CoreError;
use models::combined::CombinedTable;
use models::config::ReportConfig;
use models::portfolio::Portfolio;
use models::ticker::ResolvedTicker;
use providers::traits::{InflationProvider, QuoteProvider};
use providers::worldbank::WorldBankProvider;
use providers::yahoo::YahooQuoteProvider;
use report::composer::Composer;
use services::exchange::ExchangeRateService;
use services::inflation::InflationService;
use services::join::join_all;
use services::overview::{build_overview, PortfolioOverview};
use services::tickers::TickerService;
use tokio::sync::watch;
use worker::{ReportStatus, ReportWorker};

/// Main entry point for the performance report core library.
/// Holds the portfolio state and the services that turn it into a report.
#[must_use]
pub struct ReportEngine {
    portfolio: Portfolio,
    config: ReportConfig,
    tickers: Arc<TickerService>,
    exchange: Arc<ExchangeRateService>,
    inflation: Arc<InflationService>,
    worker: ReportWorker,
}

impl std::fmt::Debug for ReportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngine")
            .field("positions", &self.portfolio.len())
            .field("config", &self.config)
            .field("cached_tickers", &self.tickers.cached_count())
            .finish()
    }
}

impl ReportEngine {
    /// Create an engine against the production data sources.
    pub fn new() -> Result<Self, CoreError> {
        let quotes: Arc<dyn QuoteProvider> = Arc::new(YahooQuoteProvider::new()?);
        let inflation: Arc<dyn InflationProvider> = Arc::new(WorldBankProvider::new());
        Ok(Self::with_providers(quotes, inflation))
    }

    /// Create an engine with injected data sources. This is the seam
    /// tests use to substitute mock providers.
    pub fn with_providers(
        quotes: Arc<dyn QuoteProvider>,
        inflation: Arc<dyn InflationProvider>,
    ) -> Self {
        let tickers = Arc::new(TickerService::new(Arc::clone(&quotes)));
        let exchange = Arc::new(ExchangeRateService::new(quotes));
        let inflation = Arc::new(InflationService::new(inflation));

        let composer = Arc::new(Composer::with_default_sections(
            Arc::clone(&tickers),
            Arc::clone(&exchange),
            Arc::clone(&inflation),
        ));

        Self {
            portfolio: Portfolio::default(),
            config: ReportConfig::default(),
            tickers,
            exchange,
            inflation,
            worker: ReportWorker::new(composer),
        }
    }

    // ── Portfolio and configuration ─────────────────────────────────

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn set_portfolio(&mut self, portfolio: Portfolio) {
        self.portfolio = portfolio;
    }

    /// Replace the portfolio from its CSV export form.
    pub fn load_portfolio_csv(&mut self, csv: &str) -> Result<(), CoreError> {
        self.portfolio = Portfolio::from_csv(csv)?;
        Ok(())
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReportConfig) {
        self.config = config;
    }

    // ── Pipeline queries ────────────────────────────────────────────

    /// Resolve one symbol under the current configuration.
    pub async fn resolve_ticker(&self, symbol: &str) -> Result<ResolvedTicker, CoreError> {
        self.tickers.resolve(symbol, self.config.period).await
    }

    /// The joined and rebased daily table for one holding against the
    /// configured benchmark, currency, and country inflation.
    pub async fn combined_table(&self, symbol: &str) -> Result<CombinedTable, CoreError> {
        let ticker = self.tickers.resolve(symbol, self.config.period).await?;
        let comparison = self
            .tickers
            .resolve(&self.config.comparison_ticker, self.config.period)
            .await?;

        join_all(
            &self.exchange,
            &self.inflation,
            &self.config,
            &ticker,
            &comparison,
        )
        .await
    }

    /// Value every position in the display currency.
    pub async fn overview(&self) -> Result<PortfolioOverview, CoreError> {
        build_overview(&self.tickers, &self.exchange, &self.portfolio, &self.config).await
    }

    /// Daily exchange-rate series between two currencies.
    pub async fn exchange_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<models::series::TimeSeries, CoreError> {
        self.exchange.get_exchange_rate(from, to).await
    }

    /// Daily inflation index for a country, anchored at 1.0.
    pub async fn inflation_index(
        &self,
        country: &str,
    ) -> Result<models::series::TimeSeries, CoreError> {
        self.inflation.get_inflation_rate(country).await
    }

    // ── Report generation ───────────────────────────────────────────

    /// Start a background report run into `output_dir`. Refused with
    /// `AlreadyRunning` while a previous run is still in flight.
    pub fn start_report(&self, output_dir: PathBuf) -> Result<(), CoreError> {
        self.worker
            .start(self.portfolio.clone(), self.config.clone(), output_dir)
    }

    /// Subscribe to status updates of the background run.
    pub fn report_status(&self) -> watch::Receiver<ReportStatus> {
        self.worker.status()
    }

    pub fn is_report_running(&self) -> bool {
        self.worker.is_running()
    }

    // ── Maintenance ─────────────────────────────────────────────────

    /// Drop memoized ticker resolutions, forcing fresh data next pass.
    pub fn clear_ticker_cache(&self) {
        self.tickers.clear();
    }
}

/// Convenience re-export: the fixed start of the unit and inflation
/// calendars.
pub fn unit_series_start() -> NaiveDate {
    services::calendar::unit_series_start()
}
