//! ConfigurationService: scoped, validated access to the configuration store.

mod configuration;
pub use configuration::ConfigurationService;
