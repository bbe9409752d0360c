//! Observation hooks for cache and resolver activity
//!
//! The library never configures logging itself. Components report what they do
//! as [`Event`]s to an injected [`Observer`]; [`LogObserver`] forwards them to
//! the `log` facade and the binary decides where that output goes.

use std::path::Path;

use crate::cache::Section;
use crate::data::ProviderError;

/// Log target used by [`LogObserver`]
pub const LOG_TARGET: &str = "geocache";

/// Something notable that happened in the cache store or the resolver
#[derive(Debug)]
pub enum Event<'a> {
    /// No snapshot existed, a fresh cache was created in memory
    CacheCreated,
    /// A snapshot was read from disk
    CacheLoaded { path: &'a Path },
    /// The full cache was written to disk
    CacheWritten { path: &'a Path, entries: usize },
    /// The snapshot file was deleted
    CacheCleared { path: &'a Path },
    /// A single entry was removed from a section
    EntryRemoved { section: Section, key: &'a str },
    /// An address was served from the cache
    CacheHit { address: &'a str, matches: usize },
    /// An address is being requested from the provider
    Fetching { address: &'a str },
    /// The provider returned matches, which are now cached
    Fetched { address: &'a str, matches: usize },
    /// The provider answered but found nothing
    NoMatches { address: &'a str },
    /// The provider call failed
    FetchFailed {
        address: &'a str,
        error: &'a ProviderError,
    },
    /// The resolver persisted the cache after `processed` addresses
    Checkpoint { processed: usize },
}

/// Receives events from the cache store and the resolver
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event<'_>);
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&self, event: &Event<'_>) {
        match *event {
            Event::CacheCreated => log::info!(target: LOG_TARGET, "creating new cache object"),
            Event::CacheLoaded { path } => {
                log::info!(target: LOG_TARGET, "loading cache from file `{}`", path.display())
            }
            Event::CacheWritten { path, entries } => log::info!(
                target: LOG_TARGET,
                "writing cache with {} entries to file `{}`",
                entries,
                path.display()
            ),
            Event::CacheCleared { path } => {
                log::info!(target: LOG_TARGET, "deleted cache file `{}`", path.display())
            }
            Event::EntryRemoved { section, key } => log::info!(
                target: LOG_TARGET,
                "removed item `{}` in cache section `{}`",
                key,
                section
            ),
            Event::CacheHit { address, matches } => log::info!(
                target: LOG_TARGET,
                "found {} geocoding results in cache for address `{}`",
                matches,
                address
            ),
            Event::Fetching { address } => log::info!(
                target: LOG_TARGET,
                "requesting Geocoding API for address `{}`",
                address
            ),
            Event::Fetched { address, matches } => log::info!(
                target: LOG_TARGET,
                "will save {} geocoding results to cache for address `{}`",
                matches,
                address
            ),
            Event::NoMatches { address } => log::debug!(
                target: LOG_TARGET,
                "no geocoding results for address `{}`",
                address
            ),
            Event::FetchFailed { address, error } => log::error!(
                target: LOG_TARGET,
                "geocoding failure - {} for address `{}`: '{}'",
                error.kind(),
                address,
                error.detail()
            ),
            Event::Checkpoint { processed } => log::debug!(
                target: LOG_TARGET,
                "checkpoint after {} addresses",
                processed
            ),
        }
    }
}

/// Discards all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&self, _event: &Event<'_>) {}
}


#[cfg(test)]
mod tests {
    use super::recording::{Recorded, RecordingObserver};
    use super::*;

    #[test]
    fn test_log_observer_handles_every_event() {
        let path = Path::new("/tmp/geocache_cache.json");
        let error = ProviderError::Timeout("10s".to_string());
        let events = [
            Event::CacheCreated,
            Event::CacheLoaded { path },
            Event::CacheWritten { path, entries: 3 },
            Event::CacheCleared { path },
            Event::EntryRemoved {
                section: Section::Geocoding,
                key: "a",
            },
            Event::CacheHit {
                address: "a",
                matches: 1,
            },
            Event::Fetching { address: "a" },
            Event::Fetched {
                address: "a",
                matches: 2,
            },
            Event::NoMatches { address: "a" },
            Event::FetchFailed {
                address: "a",
                error: &error,
            },
            Event::Checkpoint { processed: 10 },
        ];

        // No logger installed: must simply not panic
        for event in &events {
            LogObserver.notify(event);
            NoopObserver.notify(event);
        }
    }

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::default();
        observer.notify(&Event::Fetching { address: "x" });
        observer.notify(&Event::Fetched {
            address: "x",
            matches: 1,
        });

        assert_eq!(
            observer.events(),
            vec![
                Recorded::Fetching("x".to_string()),
                Recorded::Fetched("x".to_string())
            ]
        );
        assert_eq!(observer.fetches(), 1);
        assert_eq!(observer.writes(), 0);
    }
}
