use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use super::SESSION_COOKIE;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionCodec;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION as TRACING_TARGET;

/// Identity of the caller, verified from the session cookie.
///
/// The username held here is the only owner handlers may pass to the
/// expense store. Extraction runs once per request; later extractors in the
/// same request reuse the cached result.
///
/// | Condition                          | Rejection          |
/// |------------------------------------|--------------------|
/// | no `token` cookie                  | `401 Unauthorized` |
/// | `Cookie` header is not valid UTF-8 | `400 Bad Request`  |
/// | empty `token` cookie               | `400 Bad Request`  |
/// | any token verification failure     | `401 Unauthorized` |
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    username: String,
}

impl AuthSession {
    /// Wraps a username that has already been verified.
    #[inline]
    pub fn from_verified(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Returns the authenticated username.
    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Reads the raw session token out of the request headers.
    fn extract_token(parts: &Parts) -> Result<String> {
        let readable = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .all(|value| value.to_str().is_ok());

        if !readable {
            tracing::debug!(target: TRACING_TARGET, "Unreadable cookie header");
            return Err(ErrorKind::MalformedAuthToken.with_resource("authentication"));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Err(ErrorKind::MissingAuthToken.with_resource("authentication"));
        };

        let token = cookie.value().trim();
        if token.is_empty() {
            tracing::debug!(target: TRACING_TARGET, "Empty session cookie");
            return Err(ErrorKind::MalformedAuthToken.with_resource("authentication"));
        }

        Ok(token.to_owned())
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Sync + Send,
    SessionCodec: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Self>() {
            return Ok(session.clone());
        }

        let token = Self::extract_token(parts)?;
        let codec = SessionCodec::from_ref(state);

        let username = codec.verify(&token).map_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = %error,
                "Session rejected"
            );
            Error::from(error)
        })?;

        tracing::trace!(target: TRACING_TARGET, username = %username, "Session verified");

        let session = Self::from_verified(username);
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{HeaderValue, Request, StatusCode};
    use jiff::Timestamp;

    use super::*;
    use crate::service::{MIN_SECRET_LEN, SessionKeys};

    fn codec(secret: &str) -> SessionCodec {
        let keys = SessionKeys::from_secret(secret).unwrap();
        SessionCodec::new(keys, "tally", Duration::from_secs(900))
    }

    fn parts_with_cookie(value: HeaderValue) -> Parts {
        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();
        parts.headers.insert(COOKIE, value);
        parts
    }

    async fn extract(parts: &mut Parts, codec: &SessionCodec) -> Result<AuthSession> {
        AuthSession::from_request_parts(parts, codec).await
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        let codec = codec(&"s".repeat(MIN_SECRET_LEN));
        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();

        let error = extract(&mut parts, &codec).await.unwrap_err();
        assert_eq!(error.kind().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn other_cookies_only_is_unauthorized() {
        let codec = codec(&"s".repeat(MIN_SECRET_LEN));
        let mut parts = parts_with_cookie(HeaderValue::from_static("theme=dark"));

        let error = extract(&mut parts, &codec).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingAuthToken);
    }

    #[tokio::test]
    async fn unreadable_cookie_header_is_bad_request() {
        let codec = codec(&"s".repeat(MIN_SECRET_LEN));
        let value = HeaderValue::from_bytes(b"token=\xff\xfe").unwrap();
        let mut parts = parts_with_cookie(value);

        let error = extract(&mut parts, &codec).await.unwrap_err();
        assert_eq!(error.kind().status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_token_is_bad_request() {
        let codec = codec(&"s".repeat(MIN_SECRET_LEN));
        let mut parts = parts_with_cookie(HeaderValue::from_static("token="));

        let error = extract(&mut parts, &codec).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let codec = codec(&"s".repeat(MIN_SECRET_LEN));
        let mut parts = parts_with_cookie(HeaderValue::from_static("token=not.a.jwt"));

        let error = extract(&mut parts, &codec).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn token_from_other_secret_is_unauthorized() -> anyhow::Result<()> {
        let issuer = codec(&"a".repeat(MIN_SECRET_LEN));
        let verifier = codec(&"b".repeat(MIN_SECRET_LEN));
        let token = issuer.issue("alice")?;

        let value = HeaderValue::from_str(&format!("token={}", token.token))?;
        let mut parts = parts_with_cookie(value);

        let error = extract(&mut parts, &verifier).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() -> anyhow::Result<()> {
        let codec = codec(&"s".repeat(MIN_SECRET_LEN));
        let token = codec.issue_at("alice", Timestamp::from_second(1_000_000)?)?;

        let value = HeaderValue::from_str(&format!("token={}", token.token))?;
        let mut parts = parts_with_cookie(value);

        let error = extract(&mut parts, &codec).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[tokio::test]
    async fn valid_token_yields_username_and_is_cached() -> anyhow::Result<()> {
        let codec = codec(&"s".repeat(MIN_SECRET_LEN));
        let token = codec.issue("alice")?;

        let value = HeaderValue::from_str(&format!("theme=dark; token={}", token.token))?;
        let mut parts = parts_with_cookie(value);

        let session = extract(&mut parts, &codec).await?;
        assert_eq!(session.username(), "alice");
        assert_eq!(parts.extensions.get::<AuthSession>(), Some(&session));
        Ok(())
    }
}
