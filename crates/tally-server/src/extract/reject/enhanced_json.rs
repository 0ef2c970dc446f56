//! JSON extractor and response wrapper with structured rejections.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// [`axum::Json`] with rejections reported as JSON `400` bodies.
///
/// Parser output is cut to its first line so clients see which field was
/// wrong without the full serde trace.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumJson(value) = AxumJson::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let (message, detail) = match &rejection {
            JsonRejection::JsonDataError(_) => ("Request body does not match the expected shape", true),
            JsonRejection::JsonSyntaxError(_) => ("Request body is not valid JSON", true),
            JsonRejection::MissingJsonContentType(_) => {
                ("Expected `Content-Type: application/json`", false)
            }
            JsonRejection::BytesRejection(_) => ("Request body could not be read", false),
            _ => return ErrorKind::InternalServerError.into_error(),
        };

        let error = ErrorKind::BadRequest.with_message(message);
        if detail {
            error.with_context(first_line(&rejection.body_text()))
        } else {
            error
        }
    }
}

/// First line of a parser message, at most 200 characters.
fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_first_line() {
        let sanitized = first_line("missing field `amount`\nat line 1 column 2");
        assert_eq!(sanitized, "missing field `amount`");
    }

    #[test]
    fn caps_message_length() {
        let sanitized = first_line(&"x".repeat(500));
        assert_eq!(sanitized.len(), 200);
    }
}
