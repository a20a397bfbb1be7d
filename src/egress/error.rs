//! Egress error definitions.

use thiserror::Error;

use crate::cluster::LookupError;

/// Message returned when the proxy function is called without a request.
pub const NIL_REQUEST: &str = "cannot calculate proxy URI for nil request";

/// Errors that can occur while deriving or using a transport configuration.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A cache lookup failed for a reason other than the object being absent.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A CA bundle holds data under the expected key, but no usable certificates.
    #[error("unable to add {key} certificates from the {name} ConfigMap in the {namespace} namespace")]
    Configuration {
        key: String,
        name: String,
        namespace: String,
    },

    /// The proxy function was handed no request, or a request it cannot route.
    #[error("{0}")]
    InvalidInput(String),

    /// A TLS client configuration could not be built from the trust store.
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    /// The HTTP client rejected part of the transport configuration.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl TransportError {
    pub(crate) fn nil_request() -> Self {
        TransportError::InvalidInput(NIL_REQUEST.to_string())
    }

    /// True for lookup failures, which the refresh loop may retry on its next pass.
    pub fn is_lookup(&self) -> bool {
        matches!(self, TransportError::Lookup(_))
    }
}

/// Result type for egress operations.
pub type TransportResult<T> = Result<T, TransportError>;
