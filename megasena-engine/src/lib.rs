pub mod aggregate;
pub mod analyzer;
pub mod cache;
pub mod config;
pub mod filter;
pub mod hot_cold;
pub mod scorer;
