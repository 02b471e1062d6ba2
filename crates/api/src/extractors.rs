//! Request extractors.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, header::USER_AGENT, request::Parts},
};
use million_db::repositories::ClientInfo;

use crate::AppState;

/// Remote address and user agent of the caller.
///
/// The address is the socket address when the server was started with
/// connect info. With `trust_proxy_headers` set, the first `X-Forwarded-For`
/// hop or `X-Real-IP` takes precedence.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta(pub ClientInfo);

impl ClientMeta {
    /// Returns the recorded client details.
    #[must_use]
    pub const fn info(&self) -> &ClientInfo {
        &self.0
    }

    /// Remote address, if known.
    #[must_use]
    pub fn ip(&self) -> Option<&str> {
        self.0.ip_address.as_deref()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(ToString::to_string)
}

fn socket_ip(parts: &Parts) -> Option<String> {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

fn client_ip(parts: &Parts, trust_proxy_headers: bool) -> Option<String> {
    if trust_proxy_headers {
        forwarded_ip(&parts.headers).or_else(|| socket_ip(parts))
    } else {
        socket_ip(parts)
    }
}

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip_address = client_ip(parts, state.trust_proxy_headers);

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        Ok(Self(ClientInfo {
            ip_address,
            user_agent,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(forwarded_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(forwarded_ip(&headers).as_deref(), Some("198.51.100.2"));
        assert_eq!(forwarded_ip(&HeaderMap::new()), None);
    }

    fn request_parts(forwarded: &'static str, peer: Option<&str>) -> Parts {
        let mut request = axum::http::Request::builder()
            .header("x-forwarded-for", forwarded)
            .body(())
            .unwrap();
        if let Some(peer) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        }
        request.into_parts().0
    }

    #[test]
    fn test_proxy_headers_ignored_unless_trusted() {
        let parts = request_parts("203.0.113.7", Some("192.0.2.1:4000"));
        assert_eq!(client_ip(&parts, false).as_deref(), Some("192.0.2.1"));
        assert_eq!(client_ip(&parts, true).as_deref(), Some("203.0.113.7"));

        let parts = request_parts("203.0.113.7", None);
        assert_eq!(client_ip(&parts, false), None);
    }
}
