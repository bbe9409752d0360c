//! The persisted cache snapshot
//!
//! One `Cache` value is the entire durable state: a schema version, a log of
//! outbound requests per section, and the cached results per section.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::GeocodeMatch;

/// Schema version written by this crate and the only one it reads
pub const CACHE_VERSION: u32 = 1;

/// A named result section within the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Geocoding,
}

impl Section {
    /// All known sections
    pub const ALL: [Section; 1] = [Section::Geocoding];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Geocoding => "geocoding",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a section name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid cache section: '{0}'. Valid sections: geocoding")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// The complete cache state as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    /// Schema version, always [`CACHE_VERSION`] for caches this crate accepts
    pub version: u32,
    /// Timestamp of every outbound request attempt, per section
    #[serde(rename = "requests")]
    pub request_log: BTreeMap<Section, Vec<DateTime<Utc>>>,
    /// Geocoding results keyed by the exact submitted address
    pub geocoding: BTreeMap<String, Vec<GeocodeMatch>>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    /// Creates an empty cache stamped with the current schema version
    pub fn new() -> Self {
        let request_log = Section::ALL
            .into_iter()
            .map(|section| (section, Vec::new()))
            .collect();
        Self {
            version: CACHE_VERSION,
            request_log,
            geocoding: BTreeMap::new(),
        }
    }

    /// Returns the result mapping of a section
    pub fn section(&self, section: Section) -> &BTreeMap<String, Vec<GeocodeMatch>> {
        match section {
            Section::Geocoding => &self.geocoding,
        }
    }

    /// Returns the mutable result mapping of a section
    pub fn section_mut(&mut self, section: Section) -> &mut BTreeMap<String, Vec<GeocodeMatch>> {
        match section {
            Section::Geocoding => &mut self.geocoding,
        }
    }

    /// Appends a request timestamp to the log of a section
    pub fn log_request(&mut self, section: Section, at: DateTime<Utc>) {
        self.request_log.entry(section).or_default().push(at);
    }

    /// Number of logged requests for a section
    pub fn request_count(&self, section: Section) -> usize {
        self.request_log.get(&section).map_or(0, Vec::len)
    }

    /// Total number of cached results across all sections
    pub fn len(&self) -> usize {
        Section::ALL
            .into_iter()
            .map(|section| self.section(section).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_match;

    #[test]
    fn test_new_cache_is_versioned_and_empty() {
        let cache = Cache::new();
        assert_eq!(cache.version, CACHE_VERSION);
        assert!(cache.is_empty());
        assert_eq!(cache.request_count(Section::Geocoding), 0);
        assert!(cache.request_log.contains_key(&Section::Geocoding));
    }

    #[test]
    fn test_section_parsing() {
        assert_eq!("geocoding".parse::<Section>(), Ok(Section::Geocoding));

        let err = "places".parse::<Section>().unwrap_err();
        assert_eq!(err, UnknownSection("places".to_string()));
        assert!(err.to_string().contains("places"));
    }

    #[test]
    fn test_section_display_matches_serialized_name() {
        let json = serde_json::to_string(&Section::Geocoding).unwrap();
        assert_eq!(json, format!("\"{}\"", Section::Geocoding));
    }

    #[test]
    fn test_log_request_appends_in_order() {
        let mut cache = Cache::new();
        let first = Utc::now();
        let second = first + chrono::Duration::seconds(1);

        cache.log_request(Section::Geocoding, first);
        cache.log_request(Section::Geocoding, second);

        assert_eq!(cache.request_log[&Section::Geocoding], vec![first, second]);
        assert_eq!(cache.request_count(Section::Geocoding), 2);
    }

    #[test]
    fn test_serialized_layout() {
        let mut cache = Cache::new();
        cache
            .section_mut(Section::Geocoding)
            .insert("a".to_string(), vec![sample_match("A", 1.0, 2.0)]);

        let value = serde_json::to_value(&cache).unwrap();

        assert_eq!(value["version"], 1);
        assert!(value["requests"]["geocoding"].is_array());
        assert!(value["geocoding"]["a"].is_array());
        assert_eq!(cache.len(), 1);
    }
}
