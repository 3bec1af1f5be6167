//! Client identification for rate limiting.

use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::ratelimit::UNKNOWN_KEY;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Derive the rate limit key for a request.
///
/// Order: first `X-Forwarded-For` hop, then the connection's peer address,
/// then `CF-Connecting-IP`, and finally the shared `"unknown"` key.
pub fn client_key(headers: &HeaderMap, peer_ip: Option<IpAddr>) -> String {
    if let Some(ip) = header_value(headers, X_FORWARDED_FOR)
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    if let Some(ip) = peer_ip {
        return ip.to_string();
    }

    if let Some(ip) = header_value(headers, CF_CONNECTING_IP)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    UNKNOWN_KEY.to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let map = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("cf-connecting-ip", "198.51.100.2"),
        ]);
        let peer = Some("127.0.0.1".parse().unwrap());
        assert_eq!(client_key(&map, peer), "203.0.113.7");
    }

    #[test]
    fn test_peer_ip_before_cloudflare_header() {
        let map = headers(&[("cf-connecting-ip", "198.51.100.2")]);
        let peer = Some("192.0.2.10".parse().unwrap());
        assert_eq!(client_key(&map, peer), "192.0.2.10");
    }

    #[test]
    fn test_cloudflare_header_without_peer() {
        let map = headers(&[("x-forwarded-for", "  "), ("cf-connecting-ip", "198.51.100.2")]);
        assert_eq!(client_key(&map, None), "198.51.100.2");
    }

    #[test]
    fn test_unknown_when_nothing_identifies_client() {
        assert_eq!(client_key(&HeaderMap::new(), None), UNKNOWN_KEY);
    }
}
