//! Render robots.txt or sitemap.xml without running the server.

use chrono::Utc;

use noor_storefront::config::LaunchMode;
use noor_storefront::routes::seo::{render_robots, render_sitemap};

/// Which document to print.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Document {
    Robots,
    Sitemap,
}

pub fn run(document: Document, base_url: &str, live: bool) -> Result<(), askama::Error> {
    let mode = if live {
        LaunchMode::Live
    } else {
        LaunchMode::Prelaunch
    };

    let body = match document {
        Document::Robots => render_robots(base_url, mode)?,
        Document::Sitemap => render_sitemap(base_url, mode, Utc::now().date_naive())?,
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{body}");
    }
    Ok(())
}
