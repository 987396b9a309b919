use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One position in the user's input table.
///
/// Only `ticker` and `quantity` feed the valuation pipeline; the
/// purchase/sell columns ride along for round-tripping the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub ticker: String,
    pub quantity: f64,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub sell_date: Option<NaiveDate>,
    pub sell_price: Option<f64>,
}

impl PortfolioRow {
    pub fn new(ticker: impl Into<String>, quantity: f64) -> Self {
        Self {
            ticker: ticker.into(),
            quantity,
            ..Default::default()
        }
    }

    pub fn has_symbol(&self) -> bool {
        !self.ticker.trim().is_empty()
    }
}

/// The full input table, in row order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub rows: Vec<PortfolioRow>,
}

const CSV_HEADER: &str = "Ticker,Quantity,Purchase Date,Purchase Price,Sell Date,Sell Price";

impl Portfolio {
    pub fn new(rows: Vec<PortfolioRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Export the table as CSV, matching the input-table column layout.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        csv.push('\n');
        for row in &self.rows {
            let fmt_date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
            let fmt_num = |n: Option<f64>| n.map(|n| n.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                row.ticker,
                row.quantity,
                fmt_date(row.purchase_date),
                fmt_num(row.purchase_price),
                fmt_date(row.sell_date),
                fmt_num(row.sell_price),
            ));
        }
        csv
    }

    /// Parse a CSV export back into a portfolio. The header row is
    /// required; missing optional cells parse as `None`, a missing or
    /// unparsable quantity as 0.
    pub fn from_csv(csv: &str) -> Result<Self, CoreError> {
        let mut lines = csv.lines();
        let header = lines
            .next()
            .ok_or_else(|| CoreError::ValidationError("empty CSV input".into()))?;
        if header.trim() != CSV_HEADER {
            return Err(CoreError::ValidationError(format!(
                "unexpected CSV header: '{}'",
                header.trim()
            )));
        }

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split(',').collect();
            let cell = |i: usize| cells.get(i).map(|c| c.trim()).unwrap_or("");

            let parse_date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
            let parse_num = |s: &str| s.parse::<f64>().ok();

            rows.push(PortfolioRow {
                ticker: cell(0).to_string(),
                quantity: parse_num(cell(1)).unwrap_or(0.0),
                purchase_date: parse_date(cell(2)),
                purchase_price: parse_num(cell(3)),
                sell_date: parse_date(cell(4)),
                sell_price: parse_num(cell(5)),
            });
        }

        Ok(Self { rows })
    }
}
