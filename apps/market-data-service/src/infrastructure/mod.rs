//! Infrastructure layer - Adapters and external integrations.
//!
//! - `broadcast`: Channel-based snapshot distribution
//! - `config`: Environment-driven configuration
//! - `http`: Query surface (REST + WebSocket listeners)
//! - `sources`: Quote provider adapters

pub mod broadcast;
pub mod config;
pub mod http;
pub mod sources;
