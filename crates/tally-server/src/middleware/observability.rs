//! Request tracing with request ids and redacted credentials.

use axum::Router;
use axum::extract::Request;
use axum::http::header::{self, HeaderName};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::{
    SetSensitiveRequestHeadersLayer, SetSensitiveResponseHeadersLayer,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::utility::tracing_targets::TRACING_TARGET_HTTP;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Extension trait for `axum::`[`Router`] adding per-request spans.
pub trait RouterObservabilityExt<S> {
    /// Tags each request with an `x-request-id` (kept if the client sent
    /// one), opens a span carrying it and echoes it on the response.
    ///
    /// Cookie and authorization headers are marked sensitive, so the
    /// session token never shows up in logs.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                .layer(SetSensitiveRequestHeadersLayer::new([
                    header::AUTHORIZATION,
                    header::COOKIE,
                ]))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(SetSensitiveResponseHeadersLayer::new([header::SET_COOKIE]))
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        )
    }
}

fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        target: TRACING_TARGET_HTTP,
        "request",
        method = %request.method(),
        path = request.uri().path(),
        request_id,
    )
}
