//! Quote Source Adapters
//!
//! One adapter per upstream provider, each implementing `QuoteSourcePort`:
//! a single batch request per call, provider fields mapped onto the common
//! `QuoteRecord` shape, missing numerics zero-defaulted, and no internal
//! retries. Network timeouts are each adapter's own responsibility.

mod awesome;
mod brapi;

pub use awesome::AwesomeQuoteSource;
pub use brapi::BrapiQuoteSource;
