//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions; visitor storage)
//! 5. Security headers
//! 6. Rate limiting (governor, per route group)

pub mod client_ip;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use client_ip::{ClientIp, client_ip_from_headers};
pub use rate_limit::{beacon_rate_limiter, form_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};
