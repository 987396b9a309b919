pub mod traits;
pub mod worldbank;
pub mod yahoo;
