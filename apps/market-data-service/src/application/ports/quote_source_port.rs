//! Quote Source Port
//!
//! Interface every upstream quote provider adapter implements. The refresh
//! scheduler treats all sources uniformly through this port, so providers
//! are independently swappable.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::quote::QuoteRecord;

/// Failures a quote source can report.
///
/// An `Err` is the adapter's explicit "no data this cycle" result; the
/// scheduler contains it and the cycle continues. Nothing unwinds.
#[derive(Debug, thiserror::Error)]
pub enum QuoteSourceError {
    /// Network-level failure reaching the provider.
    #[error("transport failure: {message}")]
    Transport {
        /// Underlying failure description.
        message: String,
    },

    /// Provider answered with a non-success status code.
    #[error("provider returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Provider payload could not be decoded.
    #[error("malformed payload: {message}")]
    MalformedPayload {
        /// Decode failure description.
        message: String,
    },
}

/// Port for batch quote retrieval from one upstream provider.
///
/// Adapters are stateless across calls: one network request per `fetch`,
/// no internal retries, no caching.
#[async_trait]
pub trait QuoteSourcePort: Send + Sync {
    /// Stable identifier stamped into records produced by this source.
    fn source_id(&self) -> &'static str;

    /// Fetch and normalize quotes for the given symbols in one request.
    ///
    /// Symbols missing from the provider response are omitted from the
    /// result rather than reported as errors.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider is unreachable, answers with a
    /// non-success status, or the payload cannot be decoded.
    async fn fetch(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, QuoteRecord>, QuoteSourceError>;
}
