pub mod combined;
pub mod config;
pub mod portfolio;
pub mod series;
pub mod ticker;
