//! Geolocation lookup for debugging locale suggestions.

use std::net::IpAddr;

use noor_storefront::config::GeoConfig;
use noor_storefront::services::{GeoClient, GeoError};

/// Look up `ip` (or this machine's public address) and print the result.
pub async fn run(ip: Option<IpAddr>, api_base: Option<String>) -> Result<(), GeoError> {
    let config = api_base.map_or_else(GeoConfig::default, |api_base| GeoConfig { api_base });
    let client = GeoClient::new(&config)?;

    let result = client.lookup(ip).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("country:  {} ({})", result.country_name, result.country_code);
        if let Some(city) = &result.city {
            println!("city:     {city}");
        }
        println!("language: {}", result.suggested_language);
        println!("currency: {}", result.suggested_currency);
    }
    Ok(())
}
