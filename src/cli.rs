//! Command-line interface parsing for geocache
//!
//! This module handles parsing of CLI arguments using clap and turns them,
//! together with the environment, into a [`GeocoderConfig`].

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::cache::{CacheManager, Section};
use crate::data::google::DEFAULT_TIMEOUT_SECS;
use crate::data::GoogleMapsClient;
use crate::resolver::{parse_address_list, ResolveError};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// Geocoding needs credentials
    #[error("Missing API key: pass --api-key or set GOOGLE_MAPS_API_KEY")]
    MissingApiKey,

    /// No --cache-dir was given and no platform cache directory exists
    #[error("Cannot determine a cache directory: pass --cache-dir or set GEOCACHE_DIR")]
    NoCacheDir,

    /// The specified section name is not recognized
    #[error("Invalid section: '{0}'. Valid sections: geocoding")]
    InvalidSection(String),

    /// The address input file could not be read
    #[error("Cannot read address file {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The address input has the wrong shape
    #[error(transparent)]
    Input(#[from] ResolveError),
}

/// geocache - cached geocoding of addresses
#[derive(Parser, Debug)]
#[command(name = "geocache")]
#[command(about = "Cached geocoding of addresses via the Google Maps Geocoding API")]
#[command(version)]
pub struct Cli {
    /// Directory holding the cache file (defaults to the platform cache dir)
    #[arg(long, global = true, env = "GEOCACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Google Cloud API key
    #[arg(long, global = true, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true, env = "GEOCACHE_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS, value_name = "SECS")]
    pub timeout: u64,

    /// Language of the returned results, e.g. `en` or `de`
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Region bias as a ccTLD code, e.g. `uk`
    #[arg(long, global = true)]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Geocode addresses, using cached results where available
    ///
    /// Examples:
    ///   geocache geocode "221B Baker Street, London"
    ///   geocache geocode --input addresses.json
    Geocode {
        /// Addresses to geocode
        #[arg(conflicts_with = "input")]
        addresses: Vec<String>,

        /// Read addresses from a file containing a JSON array of strings
        #[arg(long, short, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Delete the cache file
    Clear,
    /// Remove a single cached entry
    Remove {
        /// The cache key, i.e. the address exactly as it was submitted
        key: String,

        /// Cache section the key belongs to
        #[arg(long, default_value = "geocoding")]
        section: String,
    },
    /// Show number of cached results and logged requests
    Stats,
}

/// Parses a section name argument into a [`Section`].
///
/// # Returns
/// * `Ok(Section)` if the string names a known section
/// * `Err(CliError::InvalidSection)` otherwise
pub fn parse_section_arg(s: &str) -> Result<Section, CliError> {
    s.parse().map_err(|_| CliError::InvalidSection(s.to_string()))
}

/// Collects the addresses for `geocode`, from the arguments or an input file
pub fn read_addresses(addresses: &[String], input: Option<&PathBuf>) -> Result<Vec<String>, CliError> {
    match input {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| CliError::ReadInput {
                path: path.clone(),
                source,
            })?;
            Ok(parse_address_list(&content)?)
        }
        None => Ok(addresses.to_vec()),
    }
}

/// Runtime configuration derived from CLI arguments and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    /// Directory holding the cache file
    pub cache_dir: PathBuf,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub language: Option<String>,
    pub region: Option<String>,
}

impl GeocoderConfig {
    /// Creates a GeocoderConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(GeocoderConfig)` with appropriate settings
    /// * `Err(CliError::NoCacheDir)` if no cache directory was given and none can be determined
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let cache_dir = match &cli.cache_dir {
            Some(dir) => dir.clone(),
            None => CacheManager::new()
                .map(|manager| manager.dir().to_path_buf())
                .ok_or(CliError::NoCacheDir)?,
        };

        Ok(GeocoderConfig {
            cache_dir,
            api_key: cli.api_key.clone().filter(|key| !key.is_empty()),
            base_url: cli.base_url.clone(),
            timeout: Duration::from_secs(cli.timeout),
            language: cli.language.clone(),
            region: cli.region.clone(),
        })
    }

    /// Cache manager for the configured directory
    pub fn cache_manager(&self) -> CacheManager {
        CacheManager::with_dir(self.cache_dir.clone())
    }

    /// Google Maps client for the configured credentials and options
    pub fn provider(&self) -> Result<GoogleMapsClient, CliError> {
        let api_key = self.api_key.as_ref().ok_or(CliError::MissingApiKey)?;

        let mut client = GoogleMapsClient::new(api_key.as_str()).with_timeout(self.timeout);
        if let Some(ref base_url) = self.base_url {
            client = client.with_base_url(base_url.as_str());
        }
        if let Some(ref language) = self.language {
            client = client.with_language(language.as_str());
        }
        if let Some(ref region) = self.region {
            client = client.with_region(region.as_str());
        }
        Ok(client)
    }
}
