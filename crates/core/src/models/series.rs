use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single observation (date → value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A date-keyed series of `f64` values, sorted by date with unique dates.
///
/// Missing observations are represented as `f64::NAN` so that joins and
/// arithmetic carry gaps through instead of failing. Dates are calendar
/// days (`NaiveDate`) — there is no time-of-day or timezone to strip.
///
/// After running through the calendar filler a series has exactly one
/// point per calendar day in its range; before that, any spacing is legal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from unordered points. Sorts by date; on duplicate
    /// dates the last value wins.
    pub fn from_points(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by(|b, a| {
            if a.date == b.date {
                a.value = b.value;
                true
            } else {
                false
            }
        });
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Insert or overwrite the value at `date`, keeping sorted order.
    pub fn set(&mut self, date: NaiveDate, value: f64) {
        match self.points.binary_search_by_key(&date, |p| p.date) {
            Ok(idx) => self.points[idx].value = value,
            Err(idx) => self.points.insert(idx, SeriesPoint { date, value }),
        }
    }

    /// Exact-date lookup. `None` when the date is not present at all;
    /// a present-but-gap observation comes back as NaN.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    /// Most recent finite value on or before `date`.
    pub fn asof(&self, date: NaiveDate) -> Option<f64> {
        let end = match self.points.binary_search_by_key(&date, |p| p.date) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        };
        self.points[..end]
            .iter()
            .rev()
            .map(|p| p.value)
            .find(|v| v.is_finite())
    }

    /// Last finite value of the series.
    pub fn last_value(&self) -> Option<f64> {
        self.points
            .iter()
            .rev()
            .map(|p| p.value)
            .find(|v| v.is_finite())
    }

    /// First finite value of the series.
    pub fn first_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).find(|v| v.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    /// True when every calendar day between the first and last point is
    /// present (the post-calendar-filler invariant).
    pub fn is_daily(&self) -> bool {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => {
                (last - first).num_days() + 1 == self.points.len() as i64
            }
            _ => true,
        }
    }

    /// Map every value through `f`, keeping dates.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> TimeSeries {
        TimeSeries {
            points: self
                .points
                .iter()
                .map(|p| SeriesPoint {
                    date: p.date,
                    value: f(p.value),
                })
                .collect(),
        }
    }
}

/// Iterate every calendar day from `start` to `end` inclusive.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let days = (end - start).num_days().max(-1);
    (0..=days).map(move |offset| start + Duration::days(offset))
}
