use chrono::{NaiveDate, Utc};
use log::warn;

use crate::models::series::{date_range, TimeSeries};

/// Fixed start of every identity (unit) series: 2015-01-01.
pub fn unit_series_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid fixed date")
}

/// Current calendar date. Callers pass this as `until` where the
/// original pipeline anchored a series to "today".
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Expand a sparse series to a gapless daily calendar, forward-filling
/// values.
///
/// The calendar runs from the series' first date to `until` when given
/// (dropping any source rows after it), otherwise to the series' own
/// last date. Days before the first finite observation stay NaN — that
/// is accepted, not an error.
///
/// Degenerate input (empty series, or `until` before the series start)
/// is warned about and passed through unchanged; callers needing strict
/// behavior can compare the output against the input.
pub fn fill_missing_dates(series: &TimeSeries, until: Option<NaiveDate>) -> TimeSeries {
    let (Some(start), Some(last)) = (series.first_date(), series.last_date()) else {
        warn!("fill_missing_dates: supplied series is empty, passing through");
        return series.clone();
    };

    let end = until.unwrap_or(last);
    if end < start {
        warn!("fill_missing_dates: target end {end} precedes series start {start}, passing through");
        return series.clone();
    }

    let mut filled = TimeSeries::new();
    let mut carried = f64::NAN;
    for day in date_range(start, end) {
        if let Some(v) = series.get(day) {
            if v.is_finite() {
                carried = v;
            }
        }
        filled.set(day, carried);
    }

    filled
}

/// Constant-1.0 daily series over the fixed historical window
/// (2015-01-01 through today). Used wherever a real fetch would be
/// pointless: identity currency pairs, absent inflation country.
pub fn fill_unit() -> TimeSeries {
    let mut series = TimeSeries::new();
    for day in date_range(unit_series_start(), today()) {
        series.set(day, 1.0);
    }
    series
}
