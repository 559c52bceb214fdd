//! Configuration
//!
//! Environment-driven service settings.

mod settings;

pub use settings::{ConfigError, ServiceConfig};
