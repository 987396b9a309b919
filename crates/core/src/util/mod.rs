pub mod format;
pub mod maps;
