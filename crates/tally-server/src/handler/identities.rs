//! Registration and login handlers.
//!
//! Login verifies the password through the [`CredentialStore`] and answers
//! with a session cookie. Unknown usernames and wrong passwords produce the
//! same `401` response.

use axum::Router;
use axum::extract::State;
use axum::routing::post;

use super::request::{Login, Register};
use super::response::{Session, User};
use crate::extract::{Json, SessionCookie, ValidateJson};
use crate::handler::Result;
use crate::service::{CredentialStore, ServiceState, SessionCodec};

/// Tracing target for identity operations.
const TRACING_TARGET: &str = "tally_server::handler::identities";

/// Creates a new identity.
#[tracing::instrument(skip_all)]
async fn register(
    State(credentials): State<CredentialStore>,
    ValidateJson(request): ValidateJson<Register>,
) -> Result<Json<User>> {
    tracing::trace!(
        target: TRACING_TARGET,
        username = %request.username,
        "Registration attempt"
    );

    let identity = credentials
        .register(&request.username, &request.password, request.email)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = identity.id,
        username = %identity.username,
        "User registered"
    );

    Ok(Json(identity.into()))
}

/// Verifies credentials and sets the session cookie.
#[tracing::instrument(skip_all)]
async fn login(
    State(credentials): State<CredentialStore>,
    State(sessions): State<SessionCodec>,
    ValidateJson(request): ValidateJson<Login>,
) -> Result<(SessionCookie, Json<Session>)> {
    let identity = credentials
        .verify(&request.username, &request.password)
        .await
        .inspect_err(|_| {
            tracing::warn!(
                target: TRACING_TARGET,
                username = %request.username,
                "Login failed"
            );
        })?;

    let token = sessions.issue(&identity.username)?;
    let session = Session::from(&token);

    tracing::info!(
        target: TRACING_TARGET,
        user_id = identity.id,
        username = %identity.username,
        expires_at = %token.expires_at,
        "Login succeeded"
    );

    Ok((SessionCookie(token), Json(session)))
}

/// Returns a [`Router`] with registration and login routes.
///
/// `/create-user` is kept as an alias of `/register`.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/register", post(register))
        .route("/create-user", post(register))
        .route("/login", post(login))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::extract::SESSION_COOKIE;
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn register_returns_public_profile() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/create-user")
            .json(&json!({
                "username": "alice",
                "password": "pw1",
                "email": "alice@example.com",
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "alice@example.com");
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let payload = json!({ "username": "alice", "password": "pw1" });

        server.post("/register").json(&payload).await.assert_status_ok();
        server
            .post("/register")
            .json(&payload)
            .await
            .assert_status(StatusCode::CONFLICT);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_payload_is_bad_request() -> anyhow::Result<()> {
        let server = create_test_server()?;

        server
            .post("/register")
            .json(&json!({ "username": "alice" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .post("/register")
            .json(&json!({ "username": "", "password": "pw1" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .post("/register")
            .json(&json!({ "username": "bob", "password": "pw", "email": "nope" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn login_sets_session_cookie() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let credentials = json!({ "username": "alice", "password": "pw1" });

        server.post("/register").json(&credentials).await.assert_status_ok();
        let response = server.post("/login").json(&credentials).await;

        response.assert_status_ok();
        let cookie = response.cookie(SESSION_COOKIE);
        assert!(!cookie.value().is_empty());
        assert_eq!(cookie.http_only(), Some(true));

        let body = response.json::<Value>();
        assert_eq!(body["username"], "alice");
        assert!(body.get("token").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() -> anyhow::Result<()> {
        let server = create_test_server()?;
        server
            .post("/register")
            .json(&json!({ "username": "alice", "password": "pw1" }))
            .await
            .assert_status_ok();

        let wrong_password = server
            .post("/login")
            .json(&json!({ "username": "alice", "password": "nope" }))
            .await;
        let unknown_user = server
            .post("/login")
            .json(&json!({ "username": "mallory", "password": "nope" }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_user.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.text(), unknown_user.text());
        Ok(())
    }
}
