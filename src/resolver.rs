//! Cache-augmented batch geocoding
//!
//! [`Geocoder`] resolves a batch of addresses, serving what it can from the
//! on-disk cache and asking the provider for the rest. Fresh results are
//! persisted every [`CHECKPOINT_INTERVAL`] addresses and at the end of the
//! batch, so an interrupted run loses at most one interval of new lookups.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::cache::{Cache, CacheError, CacheManager, Section};
use crate::data::{GeocodeResult, GeocodingProvider};
use crate::observer::{Event, LogObserver, Observer};

/// Number of processed addresses between two cache checkpoints
pub const CHECKPOINT_INTERVAL: usize = 10;

/// Errors that abort a batch
///
/// Provider failures never show up here; they are reported per address as
/// [`GeocodeResult::NotFound`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The input is not a list of address strings
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The cache could not be loaded or saved
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Parses a batch of addresses from a JSON array of strings
///
/// Anything else (an object, a bare string, an array with non-string items)
/// is rejected with [`ResolveError::InvalidArgument`].
pub fn parse_address_list(json: &str) -> Result<Vec<String>, ResolveError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ResolveError::InvalidArgument(format!("addresses are not valid JSON: {}", e)))?;

    let items = value.as_array().ok_or_else(|| {
        ResolveError::InvalidArgument("addresses must be a JSON array of strings".to_string())
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ResolveError::InvalidArgument(format!("address at index {} is not a string", i))
            })
        })
        .collect()
}

/// Resolves addresses through the cache, falling back to a geocoding provider
pub struct Geocoder<P> {
    cache: CacheManager,
    provider: P,
    observer: Arc<dyn Observer>,
    checkpoint_interval: usize,
}

impl<P: GeocodingProvider> Geocoder<P> {
    /// Creates a resolver over the given cache and provider
    pub fn new(cache: CacheManager, provider: P) -> Self {
        Self {
            cache,
            provider,
            observer: Arc::new(LogObserver),
            checkpoint_interval: CHECKPOINT_INTERVAL,
        }
    }

    /// Sets the observer for both the resolver and its cache manager
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.cache = self.cache.with_observer(Arc::clone(&observer));
        self.observer = observer;
        self
    }

    /// Overrides the checkpoint interval (minimum 1)
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval.max(1);
        self
    }

    /// Returns the underlying cache manager
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Resolves every address in `addresses`, in iteration order
    ///
    /// Every input address gets an entry in the returned map. Cached addresses
    /// never reach the provider. Failed or empty lookups yield
    /// [`GeocodeResult::NotFound`] and are not cached, so the next batch tries
    /// them again.
    ///
    /// # Errors
    /// Returns [`ResolveError::Cache`] if the cache cannot be loaded or a
    /// checkpoint cannot be written. Results fetched since the last successful
    /// checkpoint are then lost.
    pub fn resolve<I, S>(&self, addresses: I) -> Result<BTreeMap<String, GeocodeResult>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cache = self.cache.load()?;
        let mut resolved = BTreeMap::new();
        let mut fetched_since_checkpoint = false;

        let mut addresses = addresses.into_iter().peekable();
        let mut processed = 0;

        while let Some(address) = addresses.next() {
            let address = address.as_ref();
            processed += 1;

            let result = match cache.geocoding.get(address) {
                Some(matches) => {
                    self.observer.notify(&Event::CacheHit {
                        address,
                        matches: matches.len(),
                    });
                    GeocodeResult::from(matches.clone())
                }
                None => {
                    fetched_since_checkpoint = true;
                    self.fetch(&mut cache, address)
                }
            };
            resolved.insert(address.to_string(), result);

            let at_interval = processed % self.checkpoint_interval == 0;
            let is_last = addresses.peek().is_none();
            if fetched_since_checkpoint && (at_interval || is_last) {
                self.cache.save(&cache)?;
                self.observer.notify(&Event::Checkpoint { processed });
                fetched_since_checkpoint = false;
            }
        }

        Ok(resolved)
    }

    /// Asks the provider for one address and caches a non-empty answer
    fn fetch(&self, cache: &mut Cache, address: &str) -> GeocodeResult {
        self.observer.notify(&Event::Fetching { address });
        cache.log_request(Section::Geocoding, Utc::now());

        match self.provider.geocode(address) {
            Ok(matches) if matches.is_empty() => {
                self.observer.notify(&Event::NoMatches { address });
                GeocodeResult::NotFound
            }
            Ok(matches) => {
                self.observer.notify(&Event::Fetched {
                    address,
                    matches: matches.len(),
                });
                cache.geocoding.insert(address.to_string(), matches.clone());
                GeocodeResult::Found(matches)
            }
            Err(error) => {
                self.observer.notify(&Event::FetchFailed {
                    address,
                    error: &error,
                });
                GeocodeResult::NotFound
            }
        }
    }
}
