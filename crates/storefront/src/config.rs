//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (session store)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STRIPE_SECRET_KEY` - Stripe secret API key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_LAUNCH_MODE` - `prelaunch` or `live` (default: prelaunch)
//! - `STRIPE_API_BASE` - Stripe API base URL (default: <https://api.stripe.com>)
//! - `SLACK_WEBHOOK_URL` - Slack incoming webhook for notifications
//! - `MAILERLITE_API_KEY` - MailerLite API token (enables newsletter sync)
//! - `MAILERLITE_GROUP_ID` - MailerLite group new subscribers join
//! - `MAILERLITE_API_BASE` - MailerLite API base URL (default: <https://connect.mailerlite.com>)
//! - `GEO_API_BASE` - IP geolocation API base URL (default: <https://ipapi.co>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Whether the store is open.
///
/// Before launch only the landing page is advertised to crawlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Prelaunch,
    Live,
}

impl LaunchMode {
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

impl FromStr for LaunchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prelaunch" | "pre-launch" | "coming-soon" => Ok(Self::Prelaunch),
            "live" | "launched" => Ok(Self::Live),
            other => Err(format!("expected 'prelaunch' or 'live', got '{other}'")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, without trailing slash
    pub base_url: String,
    /// Pre-launch or live
    pub launch_mode: LaunchMode,
    /// Stripe payment configuration
    pub stripe: StripeConfig,
    /// Slack notification sink (notifications are skipped when absent)
    pub slack: Option<SlackConfig>,
    /// Mailing-list provider (subscriptions only notify Slack when absent)
    pub mailing_list: Option<MailingListConfig>,
    /// IP geolocation service
    pub geo: GeoConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (server-side only)
    pub secret_key: SecretString,
    /// API base URL
    pub api_base: String,
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Slack incoming webhook configuration.
#[derive(Clone)]
pub struct SlackConfig {
    /// Webhook URL (acts as a bearer credential)
    pub webhook_url: SecretString,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("webhook_url", &"[REDACTED]")
            .finish()
    }
}

/// `MailerLite` configuration.
#[derive(Clone)]
pub struct MailingListConfig {
    /// API token
    pub api_key: SecretString,
    /// Group new subscribers are assigned to
    pub group_id: Option<String>,
    /// API base URL
    pub api_base: String,
}

impl fmt::Debug for MailingListConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailingListConfig")
            .field("api_key", &"[REDACTED]")
            .field("group_id", &self.group_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// IP geolocation configuration.
#[derive(Debug, Clone)]
pub struct GeoConfig {
    /// API base URL
    pub api_base: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            api_base: "https://ipapi.co".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let launch_mode =
            parse_env_or_default::<LaunchMode>("STOREFRONT_LAUNCH_MODE", "prelaunch")?;

        let stripe = StripeConfig::from_env()?;
        let slack = get_optional_env("SLACK_WEBHOOK_URL").map(|url| SlackConfig {
            webhook_url: SecretString::from(url),
        });
        let mailing_list = MailingListConfig::from_env()?;
        let geo = GeoConfig {
            api_base: get_env_or_default("GEO_API_BASE", "https://ipapi.co"),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            launch_mode,
            stripe,
            slack,
            mailing_list,
            geo,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            api_base: get_env_or_default("STRIPE_API_BASE", "https://api.stripe.com"),
        })
    }
}

impl MailingListConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        if get_optional_env("MAILERLITE_API_KEY").is_none() {
            return Ok(None);
        }
        Ok(Some(Self {
            api_key: get_validated_secret("MAILERLITE_API_KEY")?,
            group_id: get_optional_env("MAILERLITE_GROUP_ID"),
            api_base: get_env_or_default("MAILERLITE_API_BASE", "https://connect.mailerlite.com"),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Configuration pointing every external service at `base`.
    pub(crate) fn test_config(base: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/noor_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            launch_mode: LaunchMode::Live,
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_51NoorAbayaK3yQ9xZ"),
                api_base: base.to_string(),
            },
            slack: None,
            mailing_list: None,
            geo: GeoConfig {
                api_base: base.to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-stripe-key", "STRIPE_SECRET_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "STRIPE_SECRET_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_stripe_shaped_key() {
        let result = validate_secret_strength(
            "sk_test_51HqLyjWDarjtT1zdp7dcXQ2bRk8mN4vF",
            "STRIPE_SECRET_KEY",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_launch_mode_parse() {
        assert_eq!("live".parse::<LaunchMode>().unwrap(), LaunchMode::Live);
        assert_eq!(
            "Pre-Launch".parse::<LaunchMode>().unwrap(),
            LaunchMode::Prelaunch
        );
        assert!("soon".parse::<LaunchMode>().is_err());
        assert!(LaunchMode::Live.is_live());
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let config = test_config("http://127.0.0.1:9");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let stripe = StripeConfig {
            secret_key: SecretString::from("sk_live_super_secret_value"),
            api_base: "https://api.stripe.com".to_string(),
        };
        let slack = SlackConfig {
            webhook_url: SecretString::from("https://hooks.slack.com/services/T1/B2/secret"),
        };

        let stripe_debug = format!("{stripe:?}");
        let slack_debug = format!("{slack:?}");

        assert!(stripe_debug.contains("api.stripe.com"));
        assert!(stripe_debug.contains("[REDACTED]"));
        assert!(!stripe_debug.contains("super_secret"));
        assert!(!slack_debug.contains("hooks.slack.com"));
    }
}
