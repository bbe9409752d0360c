//! geocache - cached geocoding from the command line
//!
//! Resolves addresses through the on-disk cache and the Google Maps Geocoding
//! API, and offers maintenance commands for the cache file.

use clap::Parser;

use geocache::cache::{CacheManager, Section};
use geocache::cli::{parse_section_arg, read_addresses, Cli, Command, GeocoderConfig};
use geocache::resolver::Geocoder;

/// Prints cache size and request counts per section
fn print_stats(cache_manager: &CacheManager) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_manager.load()?;
    println!("cache file: {}", cache_manager.path().display());
    println!("version: {}", cache.version);
    for section in Section::ALL {
        println!(
            "{}: {} cached results, {} requests",
            section,
            cache.section(section).len(),
            cache.request_count(section)
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = GeocoderConfig::from_cli(&cli)?;
    let cache_manager = config.cache_manager();

    match &cli.command {
        Command::Geocode { addresses, input } => {
            let addresses = read_addresses(addresses, input.as_ref())?;
            let geocoder = Geocoder::new(cache_manager, config.provider()?);
            let results = geocoder.resolve(&addresses)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Clear => {
            cache_manager.clear()?;
            println!("Cleared cache at {}", cache_manager.path().display());
        }
        Command::Remove { key, section } => {
            let section = parse_section_arg(section)?;
            if cache_manager.remove_entry(key, section)? {
                println!("Removed `{}` from section `{}`", key, section);
            } else {
                println!("No entry `{}` in section `{}`", key, section);
            }
        }
        Command::Stats => print_stats(&cache_manager)?,
    }

    Ok(())
}
