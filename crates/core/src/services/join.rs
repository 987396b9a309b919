use log::warn;

use crate::errors::CoreError;
use crate::models::combined::CombinedTable;
use crate::models::config::ReportConfig;
use crate::models::series::TimeSeries;
use crate::models::ticker::ResolvedTicker;
use super::calendar::{fill_missing_dates, today};
use super::exchange::ExchangeRateService;
use super::inflation::InflationService;

/// Join the primary asset's history, the benchmark's history, both
/// exchange-rate series, and the inflation index onto one daily table,
/// and rebase the three comparison columns to 100 at the start.
///
/// The asset's date range is authoritative: rows outside it are
/// dropped, and series with shorter coverage join as NaN rather than
/// zero. Division by the first value is guarded — a zero or missing
/// first adjusted close is an `InvalidSeries` error, not a silent
/// arithmetic fault.
pub async fn join_all(
    exchange: &ExchangeRateService,
    inflation: &InflationService,
    config: &ReportConfig,
    asset: &ResolvedTicker,
    comparison: &ResolvedTicker,
) -> Result<CombinedTable, CoreError> {
    let history = fill_missing_dates(&asset.history, Some(today()));
    let comparison_history = fill_missing_dates(&comparison.history, Some(today()));

    if history.is_empty() {
        return Err(CoreError::InvalidSeries(format!(
            "no price history for {}",
            asset.symbol()
        )));
    }

    let rates = exchange
        .get_exchange_rate(asset.currency(), &config.currency)
        .await?;
    let comparison_rates = exchange
        .get_exchange_rate(comparison.currency(), &config.currency)
        .await?;
    let inflation_index = inflation.get_inflation_rate(&config.country).await?;

    // Left-join everything onto the asset's daily calendar.
    let dates: Vec<_> = history.iter().map(|p| p.date).collect();
    let close: Vec<f64> = history.iter().map(|p| p.value).collect();

    let joined = |series: &TimeSeries| -> Vec<f64> {
        dates
            .iter()
            .map(|&d| series.get(d).unwrap_or(f64::NAN))
            .collect()
    };

    let rate_col = joined(&rates);
    let comparison_close = joined(&comparison_history);
    let comparison_rate_col = joined(&comparison_rates);

    let adjusted_raw: Vec<f64> = close
        .iter()
        .zip(&rate_col)
        .map(|(c, r)| c * r)
        .collect();
    // The asset column is strict: its very first row is the chart's
    // shared baseline and must be a usable divisor.
    let first_adjusted = adjusted_raw[0];
    if !first_adjusted.is_finite() || first_adjusted == 0.0 {
        return Err(CoreError::InvalidSeries(format!(
            "first currency-adjusted close of {} is zero or missing",
            asset.symbol()
        )));
    }
    let close_adjusted: Vec<f64> = adjusted_raw
        .iter()
        .map(|v| (v / first_adjusted) * 100.0)
        .collect();

    let comparison_raw: Vec<f64> = comparison_close
        .iter()
        .zip(&comparison_rate_col)
        .map(|(c, r)| c * r)
        .collect();
    // The benchmark rebases independently at its own first covered
    // value; when its coverage is shorter the leading rows stay NaN.
    let close_comparison_adjusted = rebase_to_100(&comparison_raw).unwrap_or_else(|| {
        warn!(
            "comparison series {} has no coverage over the asset range",
            comparison.symbol()
        );
        vec![f64::NAN; dates.len()]
    });

    // Inflation anchors at its value as of the asset's start date.
    let start_date = dates[0];
    let inflation_adjusted = match inflation_index.asof(start_date) {
        Some(base) if base != 0.0 => dates
            .iter()
            .map(|&d| {
                let v = inflation_index.get(d).unwrap_or(f64::NAN);
                (v / base) * 100.0
            })
            .collect(),
        _ => {
            warn!("no inflation index value as of {start_date}, leaving column empty");
            vec![f64::NAN; dates.len()]
        }
    };

    Ok(CombinedTable {
        dates,
        close,
        close_adjusted,
        close_comparison_adjusted,
        inflation_adjusted,
    })
}

/// Rebase a column so its first finite value becomes exactly 100.0.
/// Returns `None` when there is no usable (finite, non-zero) base.
fn rebase_to_100(values: &[f64]) -> Option<Vec<f64>> {
    let base = values.iter().copied().find(|v| v.is_finite())?;
    if base == 0.0 {
        return None;
    }
    Some(values.iter().map(|v| (v / base) * 100.0).collect())
}

/// Global minimum and maximum across a set of columns, ignoring NaN.
/// Columns with no finite values contribute nothing; all-empty input
/// yields `(INFINITY, NEG_INFINITY)`.
pub fn total_minmax(columns: &[&[f64]]) -> (f64, f64) {
    let mut global_min = f64::INFINITY;
    let mut global_max = f64::NEG_INFINITY;

    for column in columns {
        for &v in *column {
            if !v.is_finite() {
                continue;
            }
            if v < global_min {
                global_min = v;
            }
            if v > global_max {
                global_max = v;
            }
        }
    }

    (global_min, global_max)
}
