//! Geocoding provider abstraction
//!
//! The batch resolver talks to the network only through [`GeocodingProvider`],
//! so tests can substitute scripted providers for the real HTTP client.

use thiserror::Error;

use super::GeocodeMatch;

/// Errors a provider can report for a single lookup
///
/// The variant only matters for diagnostics: the resolver treats every
/// failure as "no result" and moves on to the next address.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection or other transport-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success HTTP status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The request did not complete within the client timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The API answered but reported an error status (e.g. `REQUEST_DENIED`)
    #[error("API error {status}: {message}")]
    Api { status: String, message: String },

    /// Anything else, e.g. an unparseable response body
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl ProviderError {
    /// Short classification label used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Transport(_) => "transport error",
            ProviderError::Http { .. } => "HTTP error",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Api { .. } => "API error",
            ProviderError::Unknown(_) => "unknown exception",
        }
    }

    /// The failure details without the classification prefix
    pub fn detail(&self) -> String {
        match self {
            ProviderError::Transport(detail)
            | ProviderError::Timeout(detail)
            | ProviderError::Unknown(detail) => detail.clone(),
            ProviderError::Http { status } => format!("status {}", status),
            ProviderError::Api { status, message } => format!("{}: {}", status, message),
        }
    }
}

/// A synchronous geocoding capability
pub trait GeocodingProvider {
    /// Looks up a single address string
    ///
    /// An empty `Vec` means the provider answered successfully but found nothing.
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeMatch>, ProviderError>;
}

impl<P: GeocodingProvider + ?Sized> GeocodingProvider for &P {
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeMatch>, ProviderError> {
        (**self).geocode(address)
    }
}

impl<P: GeocodingProvider + ?Sized> GeocodingProvider for Box<P> {
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeMatch>, ProviderError> {
        (**self).geocode(address)
    }
}
