pub mod calendar;
pub mod exchange;
pub mod inflation;
pub mod join;
pub mod overview;
pub mod tickers;
