use actix_cors::Cors;
use actix_web::{http::{header, Method}, middleware::DefaultHeaders};

const PREFLIGHT_MAX_AGE_SECS: usize = 600;

/// CORS for the relay: only allow-listed origins, `*` meaning any.
///
/// Requests without an `Origin` header (health checks, curl) are not CORS
/// requests and pass untouched. Disallowed origins get the standard CORS
/// rejection and never reach a handler.
pub fn relay_cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(PREFLIGHT_MAX_AGE_SECS)
        .block_on_origin_mismatch(true);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    let allowed = allowed_origins.to_vec();
    cors.allowed_origin_fn(move |origin, _req| {
        origin
            .to_str()
            .map(|origin| allowed.iter().any(|allowed| allowed == origin))
            .unwrap_or(false)
    })
}

/// Hardening headers on every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add((header::X_DNS_PREFETCH_CONTROL, "off"))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add((header::CONTENT_SECURITY_POLICY, "default-src 'none'; frame-ancestors 'none'"))
}
