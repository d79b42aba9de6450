use std::net::SocketAddr;

use actix_web::http::header::HeaderMap;

/// Identify the client for rate limiting.
/// `trust_x_forwarded_for`: take the first `X-Forwarded-For` hop instead of the peer address
pub fn client_identifier(
    headers: &HeaderMap,
    peer_addr: Option<SocketAddr>,
    trust_x_forwarded_for: bool,
) -> String {
    if trust_x_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    peer_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
