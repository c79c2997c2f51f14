use std::error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use model::{Coordinate, CoordinateError};

pub mod client;
pub mod place;

pub use client::{GeocoderConfig, NominatimClient};

/// Best match for a free-text address.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
}

/// Turns free-text addresses into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> GeocodeResult<ResolvedAddress>;
}

#[derive(Debug, Clone)]
pub enum GeocodeError {
    NotFound {
        address: String,
    },
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    InvalidCoordinate(CoordinateError),
}

impl GeocodeError {
    /// `false` means the service itself failed, as opposed to answering
    /// with no match.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type GeocodeResult<T> = Result<T, GeocodeError>;

impl error::Error for GeocodeError {}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeocodeError::NotFound { address } => {
                write!(f, "No match for address: {}", address)
            }
            GeocodeError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            GeocodeError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            GeocodeError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, text, url)
                }
                None => write!(f, "Invalid Response ({}) {}", status_code, url),
            },
            GeocodeError::InvalidCoordinate(e) => {
                write!(f, "Geocoder returned an invalid coordinate: {}", e)
            }
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        GeocodeError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(e: serde_json::Error) -> Self {
        GeocodeError::JsonError(Arc::new(e))
    }
}

impl From<CoordinateError> for GeocodeError {
    fn from(e: CoordinateError) -> Self {
        GeocodeError::InvalidCoordinate(e)
    }
}
