//! Opsbot core — chat wire types, configuration, and shared utilities.

pub mod config;
pub mod types;
pub mod utils;
