//! Request ID middleware for request tracing and correlation.
//!
//! Every response carries an `x-request-id`. An id sent by an upstream proxy
//! is reused when it looks sane; otherwise a UUID v4 is generated. The id is
//! recorded in the current tracing span and tagged on the Sentry scope.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id accepted as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| is_acceptable_id(id))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Non-empty, bounded, and made of visible ASCII.
fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_upstream_ids() {
        assert!(is_acceptable_id("8f14e45f-ceea-467f-a0e6-3f2c1b9d8e7a"));
        assert!(is_acceptable_id("cf-ray-7d1c2b"));
        assert!(!is_acceptable_id(""));
        assert!(!is_acceptable_id("has space"));
        assert!(!is_acceptable_id(&"x".repeat(MAX_UPSTREAM_ID_LEN + 1)));
    }
}
