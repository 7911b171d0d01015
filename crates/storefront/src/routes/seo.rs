//! robots.txt and sitemap.xml.
//!
//! Before launch only the home page is crawlable and listed. Once live, the
//! sitemap lists static pages, every category and every product.

use askama::Template;
use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};

use crate::catalog::{self, Category};
use crate::config::LaunchMode;
use crate::error::{AppError, Result};
use crate::state::AppState;

const SEO_CACHE_CONTROL: &str = "public, max-age=3600";

/// Pages listed in the live sitemap besides categories and products.
const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("/", "daily", "1.0"),
    ("/shop", "daily", "0.9"),
    ("/about", "monthly", "0.5"),
    ("/size-guide", "monthly", "0.5"),
    ("/contact", "monthly", "0.4"),
    ("/shipping", "monthly", "0.3"),
    ("/returns", "monthly", "0.3"),
    ("/privacy", "yearly", "0.2"),
    ("/terms", "yearly", "0.2"),
];

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub path: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

#[derive(Template)]
#[template(path = "robots.txt")]
struct RobotsTemplate<'a> {
    base_url: &'a str,
    live: bool,
}

#[derive(Template)]
#[template(path = "sitemap.xml")]
struct SitemapTemplate<'a> {
    base_url: &'a str,
    lastmod: String,
    entries: Vec<SitemapEntry>,
}

/// Render robots.txt.
///
/// # Errors
///
/// Returns error if the template fails to render.
pub fn render_robots(
    base_url: &str,
    mode: LaunchMode,
) -> std::result::Result<String, askama::Error> {
    RobotsTemplate {
        base_url: base_url.trim_end_matches('/'),
        live: mode.is_live(),
    }
    .render()
}

/// Sitemap entries for `mode`.
#[must_use]
pub fn sitemap_entries(mode: LaunchMode) -> Vec<SitemapEntry> {
    let entry = |path: String, changefreq, priority| SitemapEntry {
        path,
        changefreq,
        priority,
    };

    if !mode.is_live() {
        return vec![entry("/".to_string(), "weekly", "1.0")];
    }

    let pages = STATIC_PAGES
        .iter()
        .map(|(path, freq, priority)| entry((*path).to_string(), *freq, *priority));
    let categories = Category::ALL
        .iter()
        .map(|c| entry(format!("/collections/{}", c.slug()), "weekly", "0.8"));
    let products = catalog::all()
        .iter()
        .map(|p| entry(format!("/products/{}", p.id), "weekly", "0.7"));

    pages.chain(categories).chain(products).collect()
}

/// Render sitemap.xml with `lastmod` set to `today`.
///
/// # Errors
///
/// Returns error if the template fails to render.
pub fn render_sitemap(
    base_url: &str,
    mode: LaunchMode,
    today: NaiveDate,
) -> std::result::Result<String, askama::Error> {
    SitemapTemplate {
        base_url: base_url.trim_end_matches('/'),
        lastmod: today.format("%Y-%m-%d").to_string(),
        entries: sitemap_entries(mode),
    }
    .render()
}

/// GET /robots.txt
pub async fn robots(State(state): State<AppState>) -> Result<Response> {
    let config = state.config();
    let body = render_robots(&config.base_url, config.launch_mode)
        .map_err(|e| AppError::Internal(format!("robots template: {e}")))?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (CACHE_CONTROL, SEO_CACHE_CONTROL),
        ],
        body,
    )
        .into_response())
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> Result<Response> {
    let config = state.config();
    let body = render_sitemap(&config.base_url, config.launch_mode, Utc::now().date_naive())
        .map_err(|e| AppError::Internal(format!("sitemap template: {e}")))?;

    Ok((
        [
            (CONTENT_TYPE, "application/xml; charset=utf-8"),
            (CACHE_CONTROL, SEO_CACHE_CONTROL),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BASE: &str = "https://noorabaya.com";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn test_prelaunch_robots_blocks_everything_but_home() {
        let robots = render_robots(BASE, LaunchMode::Prelaunch).unwrap();
        assert!(robots.contains("Allow: /$"));
        assert!(robots.contains("Disallow: /\n"));
        assert!(robots.contains("Sitemap: https://noorabaya.com/sitemap.xml"));
    }

    #[test]
    fn test_live_robots() {
        let robots = render_robots("https://noorabaya.com/", LaunchMode::Live).unwrap();
        assert!(robots.contains("Allow: /\n"));
        assert!(robots.contains("Disallow: /api/"));
        assert!(!robots.contains("Allow: /$"));
        assert!(robots.contains("Sitemap: https://noorabaya.com/sitemap.xml"));
    }

    #[test]
    fn test_prelaunch_sitemap_lists_only_home() {
        let xml = render_sitemap(BASE, LaunchMode::Prelaunch, today()).unwrap();
        assert_eq!(xml.matches("<url>").count(), 1);
        assert!(xml.contains("<loc>https://noorabaya.com/</loc>"));
        assert!(xml.contains("<lastmod>2026-03-01</lastmod>"));
    }

    #[test]
    fn test_live_sitemap_lists_catalog() {
        let xml = render_sitemap(BASE, LaunchMode::Live, today()).unwrap();
        let expected = STATIC_PAGES.len() + Category::ALL.len() + catalog::all().len();
        assert_eq!(xml.matches("<url>").count(), expected);
        assert!(xml.contains("<loc>https://noorabaya.com/products/noor-classic</loc>"));
        assert!(xml.contains("<loc>https://noorabaya.com/collections/open-front</loc>"));
    }
}
