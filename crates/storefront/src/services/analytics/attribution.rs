//! Referrer and UTM campaign attribution.

use serde::{Deserialize, Serialize};
use url::Url;

/// Campaign parameters taken from the landing URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UtmParams {
    /// Parse `utm_*` parameters from an absolute URL or a path with a query.
    #[must_use]
    pub fn from_url(landing: &str) -> Self {
        let Some(url) = parse_lenient(landing) else {
            return Self::default();
        };

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "utm_source" => &mut params.source,
                "utm_medium" => &mut params.medium,
                "utm_campaign" => &mut params.campaign,
                "utm_term" => &mut params.term,
                "utm_content" => &mut params.content,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.to_string());
        }
        params
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.term.is_none()
            && self.content.is_none()
    }
}

/// Host of the referring page, or `"direct"` when there is none.
#[must_use]
pub fn referrer_source(referrer: Option<&str>) -> String {
    referrer
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .and_then(|r| Url::parse(r).ok())
        .and_then(|url| url.host_str().map(|host| host.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| "direct".to_string())
}

fn parse_lenient(input: &str) -> Option<Url> {
    Url::parse(input).ok().or_else(|| {
        Url::parse("http://localhost")
            .ok()
            .and_then(|base| base.join(input).ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm_from_absolute_url() {
        let utm = UtmParams::from_url(
            "https://noorabaya.com/?utm_source=instagram&utm_medium=social&utm_campaign=eid&ref=x",
        );
        assert_eq!(utm.source.as_deref(), Some("instagram"));
        assert_eq!(utm.medium.as_deref(), Some("social"));
        assert_eq!(utm.campaign.as_deref(), Some("eid"));
        assert_eq!(utm.term, None);
        assert!(!utm.is_empty());
    }

    #[test]
    fn test_utm_from_path() {
        let utm = UtmParams::from_url("/collections?utm_term=black%20abaya&utm_content=banner");
        assert_eq!(utm.term.as_deref(), Some("black abaya"));
        assert_eq!(utm.content.as_deref(), Some("banner"));
    }

    #[test]
    fn test_utm_missing_or_blank() {
        assert!(UtmParams::from_url("/").is_empty());
        assert!(UtmParams::from_url("/?utm_source=").is_empty());
    }

    #[test]
    fn test_referrer_source() {
        assert_eq!(
            referrer_source(Some("https://www.google.com/search?q=abaya")),
            "google.com"
        );
        assert_eq!(referrer_source(Some("https://l.instagram.com/")), "l.instagram.com");
        assert_eq!(referrer_source(Some("")), "direct");
        assert_eq!(referrer_source(Some("not a url")), "direct");
        assert_eq!(referrer_source(None), "direct");
    }
}
