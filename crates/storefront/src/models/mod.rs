//! Types persisted in the visitor session.

pub mod session;

pub use session::{CookieConsent, DetectedLocale};
