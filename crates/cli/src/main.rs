//! Noor Abaya CLI - session store setup and storefront tooling.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! noor-cli migrate
//!
//! # Show 450 AED in every display currency
//! noor-cli convert 450
//!
//! # Show 450 AED in dollars and riyals
//! noor-cli convert 450 -c USD -c SAR
//!
//! # Print the live sitemap
//! noor-cli seo sitemap --base-url https://noorabaya.com --live
//!
//! # Check what the storefront would suggest for an address
//! noor-cli geo 5.195.0.1
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::IpAddr;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "noor-cli")]
#[command(author, version, about = "Noor Abaya storefront tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the `PostgreSQL` session table
    Migrate,
    /// Convert a base-currency (AED) price for display
    Convert {
        /// Amount in AED
        amount: String,

        /// Target currency code (repeatable; default: all)
        #[arg(short, long = "currency")]
        currencies: Vec<String>,
    },
    /// Render robots.txt or sitemap.xml
    Seo {
        #[arg(value_enum)]
        document: commands::seo::Document,

        /// Public storefront URL
        #[arg(long, env = "STOREFRONT_BASE_URL")]
        base_url: String,

        /// Render for the launched store instead of pre-launch
        #[arg(long)]
        live: bool,
    },
    /// Geolocate an IP address (default: this machine)
    Geo {
        ip: Option<IpAddr>,

        /// Geolocation API base URL
        #[arg(long, env = "GEO_API_BASE")]
        api_base: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Convert { amount, currencies } => commands::convert::run(&amount, &currencies)?,
        Commands::Seo {
            document,
            base_url,
            live,
        } => commands::seo::run(document, &base_url, live)?,
        Commands::Geo { ip, api_base } => commands::geo::run(ip, api_base).await?,
    }
    Ok(())
}
