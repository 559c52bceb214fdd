//! Port definitions for external collaborators.

mod quote_source_port;

pub use quote_source_port::{QuoteSourceError, QuoteSourcePort};
