use chrono::NaiveDate;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::series::{date_range, TimeSeries};
use crate::providers::traits::InflationProvider;
use super::calendar::{fill_unit, unit_series_start};

/// Only rates for years strictly after this feed the index.
const START_YEAR: i32 = 2014;

/// Builds a daily compounding price-index series from annual inflation
/// rates.
///
/// The index anchors at 1.0 on 2015-01-01; the rate reported for year Y
/// takes effect at Y+1's January 1st. Between anchors the *logarithm* of
/// the index is interpolated linearly and exponentiated back, so daily
/// values compound smoothly instead of stepping linearly between
/// year-end checkpoints.
pub struct InflationService {
    provider: Arc<dyn InflationProvider>,
}

impl InflationService {
    pub fn new(provider: Arc<dyn InflationProvider>) -> Self {
        Self { provider }
    }

    /// Statistics sources key some countries differently than ISO3.
    fn country_code(country_iso3: &str) -> &str {
        match country_iso3 {
            "DEU" => "DE",
            other => other,
        }
    }

    /// Daily interpolated price-index series for a country.
    ///
    /// An empty country code yields the constant-1.0 identity series (no
    /// inflation adjustment downstream). Network failures propagate as
    /// typed errors — a timeout is fatal for the inflation column, not
    /// silently swallowed.
    pub async fn get_inflation_rate(&self, country_iso3: &str) -> Result<TimeSeries, CoreError> {
        if country_iso3.is_empty() {
            return Ok(fill_unit());
        }

        let mut rates = self
            .provider
            .annual_rates(Self::country_code(country_iso3))
            .await?;

        rates.retain(|r| r.year > START_YEAR);
        rates.sort_by_key(|r| r.year);

        let last_year = rates
            .last()
            .map(|r| r.year)
            .ok_or_else(|| CoreError::InvalidSeries(format!(
                "no inflation data after {START_YEAR} for {country_iso3}"
            )))?;

        // Compound the annual rates into index anchors. Deflation is
        // valid input; an index driven to or below zero is not.
        let mut anchors: Vec<(NaiveDate, f64)> = vec![(unit_series_start(), 1.0)];
        let mut index = 1.0;
        for rate in &rates {
            index *= 1.0 + rate.rate;
            if index <= 0.0 {
                return Err(CoreError::InvalidSeries(format!(
                    "inflation index for {country_iso3} is non-positive in {}",
                    rate.year
                )));
            }
            let effective = NaiveDate::from_ymd_opt(rate.year + 1, 1, 1)
                .expect("January 1st is always valid");
            anchors.push((effective, index));
        }

        let end = NaiveDate::from_ymd_opt(last_year + 1, 1, 1)
            .expect("January 1st is always valid");

        Ok(Self::log_interpolate(&anchors, unit_series_start(), end))
    }

    /// Daily series over [start, end] from sparse anchors, linear in log
    /// space. Anchors are assumed sorted and strictly positive.
    fn log_interpolate(
        anchors: &[(NaiveDate, f64)],
        start: NaiveDate,
        end: NaiveDate,
    ) -> TimeSeries {
        let mut series = TimeSeries::new();
        let mut upper = 0usize;

        for day in date_range(start, end) {
            while upper < anchors.len() && anchors[upper].0 < day {
                upper += 1;
            }

            let value = if upper < anchors.len() && anchors[upper].0 == day {
                anchors[upper].1
            } else if upper == 0 || upper >= anchors.len() {
                f64::NAN
            } else {
                let (prev_date, prev_val) = anchors[upper - 1];
                let (next_date, next_val) = anchors[upper];
                let span = (next_date - prev_date).num_days() as f64;
                let t = (day - prev_date).num_days() as f64 / span;
                let ln = prev_val.ln() + t * (next_val.ln() - prev_val.ln());
                ln.exp()
            };

            series.set(day, value);
        }

        series
    }
}
