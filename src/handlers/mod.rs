//! HTTP handlers for the configuration API.

pub mod config;
pub use config::*;
