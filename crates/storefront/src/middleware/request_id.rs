//! Request correlation ids.
//!
//! Every request carries an `x-request-id`. An upstream value is kept when it
//! is short printable ASCII; anything else is replaced with a fresh UUID v4.
//! The id lands on the trace span, the Sentry scope, the request extensions
//! and the response headers.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_UPSTREAM_LEN: usize = 128;

/// Correlation id of the current request, available as an `Extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

fn upstream_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let usable = !value.is_empty()
        && value.len() <= MAX_UPSTREAM_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    usable.then(|| value.to_string())
}

fn resolve(headers: &HeaderMap) -> String {
    upstream_id(headers).unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = resolve(request.headers());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_upstream_id_kept() {
        assert_eq!(resolve(&headers("cf-abc123")), "cf-abc123");
    }

    #[test]
    fn test_unusable_upstream_id_replaced() {
        let long = "x".repeat(MAX_UPSTREAM_LEN + 1);
        for bad in ["", "has space", long.as_str()] {
            let id = resolve(&headers(bad));
            assert!(Uuid::parse_str(&id).is_ok(), "{bad:?} was kept");
        }
    }

    #[test]
    fn test_missing_header_generates_uuid() {
        let id = resolve(&HeaderMap::new());
        assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 4);
    }
}
