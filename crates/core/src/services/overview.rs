use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::config::ReportConfig;
use crate::models::portfolio::Portfolio;
use super::exchange::ExchangeRateService;
use super::tickers::TickerService;

/// One position's slice of the sidebar overview table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewEntry {
    /// Position of the row in the input table.
    pub index: usize,
    pub symbol: String,
    /// Fraction of the portfolio total (0.25 = 25%).
    pub share: f64,
    /// Market value in the portfolio display currency.
    pub value: f64,
}

/// The valued portfolio: per-position entries plus the grand total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOverview {
    pub entries: Vec<OverviewEntry>,
    pub total_value: f64,
}

/// Value every portfolio position in the display currency.
///
/// Two passes by necessity: absolute values (and their sum) first, then
/// percentage shares against the completed total. Rows with an empty
/// symbol keep their slot as a zero-value placeholder so the sidebar's
/// row indices line up with the input table.
///
/// A portfolio whose total value is zero (all rows empty or unvalued)
/// is an `EmptyPortfolio` error — the share computation has no meaning.
pub async fn build_overview(
    tickers: &TickerService,
    exchange: &ExchangeRateService,
    portfolio: &Portfolio,
    config: &ReportConfig,
) -> Result<PortfolioOverview, CoreError> {
    let mut entries = Vec::with_capacity(portfolio.len());
    let mut total_value = 0.0;

    for (index, row) in portfolio.rows.iter().enumerate() {
        if !row.has_symbol() {
            entries.push(OverviewEntry {
                index,
                symbol: String::new(),
                share: 0.0,
                value: 0.0,
            });
            continue;
        }

        let value = match position_value(tickers, exchange, config, &row.ticker, row.quantity)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                // One unvalued position must not sink the whole table.
                warn!("could not value position {}: {e}", row.ticker);
                0.0
            }
        };

        total_value += value;
        entries.push(OverviewEntry {
            index,
            symbol: row.ticker.clone(),
            share: 0.0,
            value,
        });
    }

    if total_value <= 0.0 {
        return Err(CoreError::EmptyPortfolio);
    }

    for entry in &mut entries {
        entry.share = entry.value / total_value;
    }

    Ok(PortfolioOverview {
        entries,
        total_value,
    })
}

async fn position_value(
    tickers: &TickerService,
    exchange: &ExchangeRateService,
    config: &ReportConfig,
    symbol: &str,
    quantity: f64,
) -> Result<f64, CoreError> {
    let resolved = tickers.resolve(symbol, config.period).await?;

    let close = resolved.profile.previous_close.ok_or_else(|| {
        CoreError::InvalidSeries(format!("no previous close for {symbol}"))
    })?;

    let rate = exchange
        .get_latest_exchange_rate(resolved.currency(), &config.currency)
        .await?;

    Ok(quantity * rate * close)
}
