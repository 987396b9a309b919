use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The joined daily table the chart and data sections consume: one row
/// per calendar day over the primary asset's range, with the three
/// comparison columns rebased to 100 at the shared start date.
///
/// Columns are NaN where a joined series has no coverage; consumers must
/// tolerate gaps rather than treat them as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedTable {
    pub dates: Vec<NaiveDate>,

    /// Raw close in the instrument's own currency.
    pub close: Vec<f64>,

    /// Currency-adjusted close, rebased so the first row is exactly 100.
    pub close_adjusted: Vec<f64>,

    /// Benchmark's currency-adjusted close, independently rebased to 100
    /// at its first covered row.
    pub close_comparison_adjusted: Vec<f64>,

    /// Inflation price index rebased to 100 as of the asset's start date.
    pub inflation_adjusted: Vec<f64>,
}

impl CombinedTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Last finite value of a column, if any.
    pub fn last_finite(column: &[f64]) -> Option<f64> {
        column.iter().rev().copied().find(|v| v.is_finite())
    }

    /// Fraction of rows (where both columns are finite) on which `a`
    /// exceeds `b`. `None` when there is no overlapping coverage.
    pub fn fraction_above(a: &[f64], b: &[f64]) -> Option<f64> {
        let mut total = 0usize;
        let mut above = 0usize;
        for (&x, &y) in a.iter().zip(b.iter()) {
            if x.is_finite() && y.is_finite() {
                total += 1;
                if x > y {
                    above += 1;
                }
            }
        }
        if total == 0 {
            None
        } else {
            Some(above as f64 / total as f64)
        }
    }
}
