//! Handler error type and its mapping onto JSON error responses.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// A specialized [`Result`] type for handlers and extractors.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error returned by handlers and extractors.
///
/// The kind fixes the status code and default message. The optional parts
/// refine the body sent to the client and must never carry internal
/// details such as storage errors.
#[derive(Clone, Default, PartialEq, Eq)]
#[must_use = "errors do nothing unless returned"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
    resource: Option<Cow<'static, str>>,
    context: Option<Cow<'static, str>>,
}

impl Error {
    /// Creates an error of `kind` with its default message.
    #[inline]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
            context: None,
        }
    }

    /// Replaces the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the resource the request was acting on.
    pub fn with_resource(mut self, resource: impl Into<Cow<'static, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Adds a client-facing hint, e.g. which field was rejected.
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Builds the response body for this error.
    fn to_response(&self) -> ErrorResponse<'static> {
        let mut response = self.kind.response();

        if let Some(message) = &self.message {
            response = response.with_message(message.clone());
        }
        if let Some(resource) = &self.resource {
            response = response.with_resource(resource.clone());
        }
        if let Some(context) = &self.context {
            response = response.with_context(context.clone());
        }

        response
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("resource", &self.resource)
            .field("context", &self.context)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.to_response();
        write!(f, "{} {}: {}", response.status.as_u16(), response.name, response.message)?;

        if let Some(resource) = &response.resource {
            write!(f, " (resource: {resource})")?;
        }
        if let Some(context) = &response.context {
            write!(f, " ({context})")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Every failure category the API reports.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400, the payload failed to parse or validate.
    BadRequest,
    /// 400, a session cookie is present but unreadable.
    MalformedAuthToken,
    /// 401, no session cookie.
    MissingAuthToken,
    /// 401, bad credentials or a rejected session token.
    Unauthorized,
    /// 404
    NotFound,
    /// 408, the request timeout elapsed.
    RequestTimeout,
    /// 409, e.g. a taken username.
    Conflict,
    /// 500
    #[default]
    InternalServerError,
    /// 503, storage is unreachable.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Shorthand for [`Error::new`].
    #[inline]
    pub const fn into_error(self) -> Error {
        Error::new(self)
    }

    /// Shorthand for `self.into_error().with_message(..)`.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        self.into_error().with_message(message)
    }

    /// Shorthand for `self.into_error().with_resource(..)`.
    #[inline]
    pub fn with_resource(self, resource: impl Into<Cow<'static, str>>) -> Error {
        self.into_error().with_resource(resource)
    }

    /// Shorthand for `self.into_error().with_context(..)`.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'static, str>>) -> Error {
        self.into_error().with_context(context)
    }

    /// Returns the status code sent for this kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the default response body for this kind.
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::RequestTimeout => ErrorResponse::REQUEST_TIMEOUT,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => ErrorResponse::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().name)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [ErrorKind; 9] = [
        ErrorKind::BadRequest,
        ErrorKind::MalformedAuthToken,
        ErrorKind::MissingAuthToken,
        ErrorKind::Unauthorized,
        ErrorKind::NotFound,
        ErrorKind::RequestTimeout,
        ErrorKind::Conflict,
        ErrorKind::InternalServerError,
        ErrorKind::ServiceUnavailable,
    ];

    #[test]
    fn unspecified_error_is_internal() {
        let response = Error::default().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn refinements_are_kept() {
        let error = ErrorKind::Conflict
            .with_message("Username is already taken")
            .with_resource("users")
            .with_context("alice");

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.message(), Some("Username is already taken"));
        assert_eq!(error.resource(), Some("users"));
        assert_eq!(error.context(), Some("alice"));

        let display = error.to_string();
        assert!(display.starts_with("409 conflict: Username is already taken"));
        assert!(display.contains("users"));
    }

    #[test]
    fn session_kinds_split_between_400_and_401() {
        assert_eq!(ErrorKind::MissingAuthToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::MalformedAuthToken.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn every_kind_is_an_error_status() {
        for kind in ALL_KINDS {
            let status = kind.into_response().status();
            assert!(status.is_client_error() || status.is_server_error(), "{kind:?}");
        }
    }
}
