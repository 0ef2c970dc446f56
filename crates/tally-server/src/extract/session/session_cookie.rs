use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::SESSION_COOKIE;
use crate::handler::{Error, ErrorKind};
use crate::service::SessionToken;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION as TRACING_TARGET;

/// Response part that sets the session cookie.
///
/// The cookie is `HttpOnly`, `SameSite=Lax`, scoped to `/` and expires
/// together with the token.
#[must_use]
#[derive(Debug, Clone)]
pub struct SessionCookie(pub SessionToken);

impl SessionCookie {
    /// Renders the `Set-Cookie` header value.
    pub fn header_value(&self) -> Result<HeaderValue, Error> {
        let cookie = Cookie::build((SESSION_COOKIE, self.0.token.as_str()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.0.max_age_secs()))
            .build();

        HeaderValue::from_str(&cookie.to_string()).map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                "Session cookie is not a valid header value"
            );
            ErrorKind::InternalServerError.into_error()
        })
    }
}

impl IntoResponseParts for SessionCookie {
    type Error = Error;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let value = self.header_value()?;
        res.headers_mut().append(SET_COOKIE, value);
        Ok(res)
    }
}
