//! Integration test harness for the Noor Abaya storefront.
//!
//! Builds the full router (all middleware included) over an in-memory
//! session store, with every external service pointed at `wiremock`
//! servers. Requests go through `tower::ServiceExt::oneshot`; the session
//! cookie is carried between calls like a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p noor-integration-tests
//! ```

use std::net::IpAddr;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use wiremock::MockServer;

use noor_storefront::config::{
    GeoConfig, LaunchMode, MailingListConfig, SlackConfig, StorefrontConfig, StripeConfig,
};
use noor_storefront::middleware::session_layer;
use noor_storefront::state::AppState;

/// Public address sent as `X-Forwarded-For` unless a test overrides it.
pub const DEFAULT_CLIENT_IP: &str = "5.195.0.1";

const IPHONE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// External services, each backed by its own mock server.
pub struct MockServices {
    pub stripe: MockServer,
    pub geo: MockServer,
    pub slack: MockServer,
    pub mailing_list: MockServer,
}

impl MockServices {
    pub async fn start() -> Self {
        Self {
            stripe: MockServer::start().await,
            geo: MockServer::start().await,
            slack: MockServer::start().await,
            mailing_list: MockServer::start().await,
        }
    }
}

/// Response status and parsed JSON body (`Value::Null` when empty or not
/// JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
    pub json: Value,
}

/// A router plus the session cookie of one simulated browser.
pub struct TestApp {
    router: Router,
    cookie: Option<HeaderValue>,
    client_ip: String,
}

impl TestApp {
    /// Build the app against `mocks` in pre-launch mode.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    pub fn new(mocks: &MockServices) -> Self {
        Self::with_mode(mocks, LaunchMode::Prelaunch)
    }

    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    pub fn with_mode(mocks: &MockServices, launch_mode: LaunchMode) -> Self {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://unused"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "https://noorabaya.test".to_string(),
            launch_mode,
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_51HqLyjWDarjtT1zdp7dc"),
                api_base: mocks.stripe.uri(),
            },
            slack: Some(SlackConfig {
                webhook_url: SecretString::from(format!(
                    "{}/services/T000/B000",
                    mocks.slack.uri()
                )),
            }),
            mailing_list: Some(MailingListConfig {
                api_key: SecretString::from("ml_test_9fK2pQ7xL4"),
                group_id: Some("148532".to_string()),
                api_base: mocks.mailing_list.uri(),
            }),
            geo: GeoConfig {
                api_base: mocks.geo.uri(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config).expect("state builds");
        let router = noor_storefront::app(state, session_layer(MemoryStore::default(), false));

        Self {
            router,
            cookie: None,
            client_ip: DEFAULT_CLIENT_IP.to_string(),
        }
    }

    /// Send later requests as if from `ip`.
    pub fn set_client_ip(&mut self, ip: &str) {
        self.client_ip = ip.to_string();
    }

    /// Forget the session cookie, as a new browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", &self.client_ip)
            .header(header::USER_AGENT, IPHONE_USER_AGENT);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .ok()
                .and_then(|v| v.split(';').next())
                .and_then(|v| HeaderValue::from_str(v).ok());
            if pair.is_some() {
                self.cookie = pair;
            }
        }

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            text,
            json,
        }
    }
}
