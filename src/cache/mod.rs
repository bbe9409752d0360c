//! Cache module for storing geocoding results to disk
//!
//! This module provides the persisted [`Cache`] snapshot and a [`CacheManager`]
//! that loads and saves it as a whole. Results are only ever added by the
//! resolver; administrative removal goes through [`CacheManager::remove_entry`]
//! and [`CacheManager::clear`].

mod manager;
mod snapshot;

pub use manager::{CacheError, CacheManager, CACHE_FILE};
pub use snapshot::{Cache, Section, UnknownSection, CACHE_VERSION};
