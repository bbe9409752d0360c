//! geocache library
//!
//! A caching layer for geocoding: addresses are resolved through an on-disk
//! cache first and only misses are sent to the geocoding provider.

pub mod cache;
pub mod cli;
pub mod data;
pub mod observer;
pub mod resolver;

pub use cache::{Cache, CacheError, CacheManager, Section};
pub use data::{GeocodeMatch, GeocodeResult, GeocodingProvider, GoogleMapsClient, ProviderError};
pub use observer::{Event, LogObserver, NoopObserver, Observer};
pub use resolver::{Geocoder, ResolveError, CHECKPOINT_INTERVAL};
