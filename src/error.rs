//! Unified error types for Facteur.
//!
//! Defines [`FacteurError`], the single crate error enum, using
//! `thiserror` for `Display` and `Error` derives. Per-identifier
//! tracking failures are NOT errors: they are data carried in
//! [`TrackingResult`](crate::model::TrackingResult) so that one bad
//! identifier in a batch never prevents the others from rendering.
//! This enum covers fatal conditions only.

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FacteurError {
    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Malformed tracking response (no shipment data, no error code):\n{body}")]
    MalformedResponse { body: String },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
