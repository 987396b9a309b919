use serde::{Deserialize, Serialize};

/// Lookback window for price histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
}

impl Period {
    /// Wire form used by the quote source ("1y", "2y", "5y", "10y").
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Period> {
        match s {
            "1y" => Some(Period::OneYear),
            "2y" => Some(Period::TwoYears),
            "5y" => Some(Period::FiveYears),
            "10y" => Some(Period::TenYears),
            _ => None,
        }
    }

    /// Calendar length of the window in days.
    pub fn num_days(&self) -> i64 {
        match self {
            Period::OneYear => 365,
            Period::TwoYears => 2 * 365,
            Period::FiveYears => 5 * 365 + 1,
            Period::TenYears => 10 * 365 + 2,
        }
    }

    pub fn num_years(&self) -> u32 {
        match self {
            Period::OneYear => 1,
            Period::TwoYears => 2,
            Period::FiveYears => 5,
            Period::TenYears => 10,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-supplied settings for a report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Target display currency for all converted values (ISO code).
    pub currency: String,

    /// ISO3 country code whose inflation is charted; empty string means
    /// no inflation adjustment (identity series).
    pub country: String,

    /// Price history lookback.
    pub period: Period,

    /// Benchmark symbol every holding is compared against.
    pub comparison_ticker: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            country: "DEU".to_string(),
            period: Period::OneYear,
            comparison_ticker: "EUNL.DE".to_string(),
        }
    }
}
