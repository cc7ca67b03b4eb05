//! Client address extraction for activity metadata.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Returns the client IP of a request.
///
/// When `behind_proxy` is set, the first address of `X-Forwarded-For` (or
/// `X-Real-IP`) is trusted; otherwise the socket peer address is used.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}
