//! Request ID middleware for request tracing and correlation.
//!
//! Every response carries an `x-request-id`. An ID sent by an upstream proxy
//! is reused when it looks sane; anything else is replaced with a UUID v4.
//! The ID is recorded on the current span and tagged on the Sentry scope.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok()),
    );

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

/// Keep an upstream ID if it is short printable ASCII, otherwise mint one.
fn resolve_request_id(upstream: Option<&str>) -> String {
    match upstream {
        Some(id)
            if !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic()) =>
        {
            id.to_owned()
        }
        _ => Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_is_kept() {
        assert_eq!(resolve_request_id(Some("cf-8a7b6c")), "cf-8a7b6c");
    }

    #[test]
    fn test_missing_or_odd_ids_are_replaced() {
        let too_long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        for upstream in [None, Some(""), Some("has space"), Some(too_long.as_str())] {
            let id = resolve_request_id(upstream);
            assert!(Uuid::parse_str(&id).is_ok(), "{upstream:?} should be replaced");
        }
    }
}
