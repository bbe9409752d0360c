//! Core data models for geocache
//!
//! This module contains the typed geocoding payloads shared by the provider,
//! the on-disk cache and the batch resolver.

pub mod google;
pub mod provider;

pub use google::GoogleMapsClient;
pub use provider::{GeocodingProvider, ProviderError};

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude coordinate
    pub lat: f64,
    /// Longitude coordinate
    pub lng: f64,
}

/// A rectangular area given by its north-east and south-west corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

/// Location data of a single geocode match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// The geocoded point
    pub location: LatLng,
    /// Precision of the point, e.g. `ROOFTOP` or `APPROXIMATE`
    pub location_type: String,
    /// Recommended viewport for displaying the match
    pub viewport: Bounds,
    /// Bounding box of the matched feature, if it has an extent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// One component of a structured address (street number, locality, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Open Location Code for a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlusCode {
    pub global_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_code: Option<String>,
}

/// A single structured match returned by the geocoding provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    /// Human-readable address of the match
    pub formatted_address: String,
    /// Stable provider identifier of the place
    pub place_id: String,
    /// Coordinates and extent
    pub geometry: Geometry,
    /// Feature types, e.g. `street_address`
    #[serde(default)]
    pub types: Vec<String>,
    /// Structured address parts
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    /// Set when the provider could only match part of the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus_code: Option<PlusCode>,
}

/// Outcome of resolving one address
///
/// Serializes as the match array for `Found` and as `null` for `NotFound`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeocodeResult {
    /// The provider (or the cache) returned at least one match
    Found(Vec<GeocodeMatch>),
    /// The lookup failed or returned nothing
    NotFound,
}

impl GeocodeResult {
    /// Returns the matches, if any
    pub fn matches(&self) -> Option<&[GeocodeMatch]> {
        match self {
            GeocodeResult::Found(matches) => Some(matches),
            GeocodeResult::NotFound => None,
        }
    }

    /// Returns true if at least one match was found
    pub fn is_found(&self) -> bool {
        matches!(self, GeocodeResult::Found(_))
    }
}

impl From<Vec<GeocodeMatch>> for GeocodeResult {
    fn from(matches: Vec<GeocodeMatch>) -> Self {
        if matches.is_empty() {
            GeocodeResult::NotFound
        } else {
            GeocodeResult::Found(matches)
        }
    }
}
