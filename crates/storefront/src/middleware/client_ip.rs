//! Client IP resolution behind Cloudflare and Fly.io.
//!
//! Proxy headers are checked in order: `CF-Connecting-IP`, the first entry of
//! `X-Forwarded-For`, `X-Real-IP`, then `Fly-Client-IP`. The socket peer
//! address is the last resort.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};

/// Resolve the client IP from proxy headers only.
#[must_use]
pub fn client_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    header("cf-connecting-ip")
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse().ok())
        })
        .or_else(|| header("x-real-ip").and_then(|s| s.trim().parse().ok()))
        .or_else(|| header("fly-client-ip").and_then(|s| s.trim().parse().ok()))
}

/// Extractor for the visitor's IP address, if one can be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = client_ip_from_headers(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        });
        Ok(Self(ip))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderValue, Request};

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.9"),
            ("cf-connecting-ip", "198.51.100.7"),
        ]);
        assert_eq!(
            client_ip_from_headers(&map),
            Some("198.51.100.7".parse().unwrap())
        );
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let map = headers(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        assert_eq!(
            client_ip_from_headers(&map),
            Some("203.0.113.9".parse().unwrap())
        );
    }

    #[test]
    fn test_garbage_is_skipped() {
        let map = headers(&[("cf-connecting-ip", "unknown"), ("fly-client-ip", "2001:db8::1")]);
        assert_eq!(
            client_ip_from_headers(&map),
            Some("2001:db8::1".parse().unwrap())
        );
        assert_eq!(client_ip_from_headers(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_extractor_falls_back_to_peer() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 4433))));
        let (mut parts, ()) = request.into_parts();

        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip, Some("192.0.2.4".parse().unwrap()));
    }
}
