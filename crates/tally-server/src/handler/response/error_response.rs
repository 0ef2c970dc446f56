use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body of every error response: `{name, message, resource?, context?}`.
///
/// Messages are generic and safe for clients; internal failure details are
/// only ever logged. The status code travels alongside and is not part of
/// the body.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// Stable snake_case identifier.
    pub name: Cow<'a, str>,
    pub message: Cow<'a, str>,
    /// What the request was acting on, e.g. `users` or `expenses`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Hint on what to fix, e.g. the rejected field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

macro_rules! error_responses {
    ($($constant:ident => $status:ident, $name:literal, $message:literal;)+) => {
        impl ErrorResponse<'_> {
            $(
                pub const $constant: Self = Self::new($name, $message, StatusCode::$status);
            )+
        }
    };
}

error_responses! {
    BAD_REQUEST => BAD_REQUEST, "bad_request",
        "The request body or parameters are invalid";
    MALFORMED_AUTH_TOKEN => BAD_REQUEST, "malformed_auth_token",
        "The session cookie could not be read";
    MISSING_AUTH_TOKEN => UNAUTHORIZED, "missing_auth_token",
        "Sign in to access this resource";
    UNAUTHORIZED => UNAUTHORIZED, "unauthorized",
        "The session is invalid or has expired";
    NOT_FOUND => NOT_FOUND, "not_found",
        "Nothing exists at this path";
    REQUEST_TIMEOUT => REQUEST_TIMEOUT, "request_timeout",
        "The request did not complete in time";
    CONFLICT => CONFLICT, "conflict",
        "The resource already exists";
    INTERNAL_SERVER_ERROR => INTERNAL_SERVER_ERROR, "internal_server_error",
        "Something went wrong on our side, please retry later";
    SERVICE_UNAVAILABLE => SERVICE_UNAVAILABLE, "service_unavailable",
        "Storage is currently unreachable";
}

impl<'a> ErrorResponse<'a> {
    /// Creates a response without resource or context.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            context: None,
            status,
        }
    }

    /// Sets the resource. A second call appends as a path segment.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let resource = resource.into();
        self.resource = Some(match self.resource.take() {
            Some(parent) => format!("{parent}/{resource}").into(),
            None => resource,
        });
        self
    }

    /// Replaces the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the context. Further calls append, separated by `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(previous) => format!("{previous}; {context}").into(),
            None => context,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
