//! Common API utilities and shared query types

use axum::http::HeaderMap;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

use crate::models::ListParams;

/// Resolve the client IP, preferring proxy headers over the socket address.
///
/// Checks X-Forwarded-For (first hop), then X-Real-IP, then falls back to
/// the connection's peer address.
pub fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> IpAddr {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(ip) = forwarded_str
                .split(',')
                .next()
                .and_then(|s| s.trim().parse().ok())
            {
                return ip;
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            if let Ok(ip) = ip.trim().parse() {
                return ip;
            }
        }
    }

    addr.ip()
}

/// Build clamped list parameters from optional query values.
///
/// Query structs carry `page`/`per_page` as plain optional fields; serde
/// flattening does not survive the urlencoded deserializer.
pub fn list_params(page: Option<u32>, per_page: Option<u32>) -> ListParams {
    ListParams::new(page.unwrap_or(1), per_page.unwrap_or(10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = list_params(None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 10);
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let addr: SocketAddr = "10.0.0.1:443".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.2".parse().unwrap());
        assert_eq!(
            client_ip(&headers, addr),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(
            client_ip(&headers, addr),
            "198.51.100.4".parse::<IpAddr>().unwrap()
        );

        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, addr), "10.0.0.1".parse::<IpAddr>().unwrap());

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "not-an-ip".parse().unwrap());
        assert_eq!(client_ip(&headers, addr), "10.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_clamping() {
        let params = list_params(Some(0), Some(1000));
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
    }
}
