use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use futures::Future;

use crate::AppState;

/// Best guess at the submitting browser's address. `None` only when the
/// server runs without connection info and no trusted header is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

/// Forwarding headers are only read when `trust_forwarded` is set. The
/// trusted proxy appends the address it saw, so the right-most
/// `X-Forwarded-For` entry is the only one the client cannot choose.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> Option<IpAddr> {
    if trust_forwarded {
        let forwarded = headers
            .get("X-Forwarded-For")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.rsplit(',').next())
            .and_then(|last| last.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = headers
            .get("X-Real-IP")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<IpAddr>().ok());
        if real_ip.is_some() {
            return real_ip;
        }
    }
    peer.map(|addr| addr.ip())
}

impl FromRequestParts<Arc<AppState>> for ClientIp {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let ip = client_ip(&parts.headers, peer, state.trust_forwarded_headers);
        async move { Ok(ClientIp(ip)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.2:51234".parse().unwrap())
    }

    #[test]
    fn test_proxy_appended_forwarded_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("10.9.9.1, 198.51.100.77, 203.0.113.7"),
        );
        headers.insert("X-Real-IP", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(
            client_ip(&headers, peer(), true),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_real_ip_then_peer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", HeaderValue::from_static("garbage"));
        headers.insert("X-Real-IP", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(
            client_ip(&headers, peer(), true),
            Some("198.51.100.4".parse().unwrap())
        );

        assert_eq!(
            client_ip(&HeaderMap::new(), peer(), true),
            Some("10.0.0.2".parse().unwrap())
        );
        assert_eq!(client_ip(&HeaderMap::new(), None, true), None);
    }

    #[test]
    fn test_untrusted_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(
            client_ip(&headers, peer(), false),
            Some("10.0.0.2".parse().unwrap())
        );
    }
}
