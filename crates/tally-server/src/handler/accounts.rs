//! User directory handlers.
//!
//! All routes require a session. Edits and deletion only ever touch the
//! caller's own account; a `username` in the request body is ignored.

use axum::Router;
use axum::extract::State;
use axum::routing::{delete, get, put};

use super::request::EditUser;
use super::response::{Acknowledgement, User};
use crate::extract::{AuthSession, Json, ValidateJson};
use crate::handler::Result;
use crate::service::{CredentialStore, ProfileUpdate, ServiceState};

/// Tracing target for account operations.
const TRACING_TARGET: &str = "tally_server::handler::accounts";

/// Lists every registered user without password hashes.
#[tracing::instrument(skip_all)]
async fn list_users(
    State(credentials): State<CredentialStore>,
    auth_session: AuthSession,
) -> Result<Json<Vec<User>>> {
    let users = credentials.list().await?;

    tracing::debug!(
        target: TRACING_TARGET,
        requested_by = %auth_session.username(),
        count = users.len(),
        "Users listed"
    );

    Ok(Json(users.into_iter().map(User::from).collect()))
}

/// Updates the caller's email and/or password.
#[tracing::instrument(skip_all)]
async fn edit_user(
    State(credentials): State<CredentialStore>,
    auth_session: AuthSession,
    ValidateJson(request): ValidateJson<EditUser>,
) -> Result<Json<User>> {
    let update = ProfileUpdate {
        email: request.email_change(),
        password: request.password,
    };

    let identity = credentials
        .update_profile(auth_session.username(), update)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = identity.id,
        username = %identity.username,
        "User updated"
    );

    Ok(Json(identity.into()))
}

/// Deletes the caller's account and their expenses.
#[tracing::instrument(skip_all)]
async fn delete_user(
    State(credentials): State<CredentialStore>,
    auth_session: AuthSession,
) -> Result<Json<Acknowledgement>> {
    credentials.remove(auth_session.username()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        username = %auth_session.username(),
        "User deleted"
    );

    Ok(Json(Acknowledgement::new("User deleted")))
}

/// Returns a [`Router`] with the user directory routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/list-users", get(list_users))
        .route("/edit-user", put(edit_user))
        .route("/delete-user", delete(delete_user))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::handler::test::{create_test_server, register_and_login};

    #[tokio::test]
    async fn directory_requires_session() -> anyhow::Result<()> {
        let server = create_test_server()?;

        server
            .get("/list-users")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/delete-user")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn reregistered_name_starts_without_expenses() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let first = register_and_login(&server, "alice", "pw1").await;

        server
            .post("/add-expense")
            .add_cookie(first.clone())
            .json(&json!({ "description": "private", "amount": "5" }))
            .await
            .assert_status_ok();
        server
            .delete("/delete-user")
            .add_cookie(first)
            .await
            .assert_status_ok();

        let newcomer = register_and_login(&server, "alice", "another-pw").await;
        let listed = server
            .get("/get-expenses")
            .add_cookie(newcomer)
            .await
            .json::<Vec<Value>>();
        assert!(listed.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn list_users_hides_hashes() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;
        register_and_login(&server, "bob", "pw2").await;

        let response = server.get("/list-users").add_cookie(cookie).await;
        response.assert_status_ok();

        let users = response.json::<Vec<Value>>();
        let names: Vec<_> = users.iter().map(|u| u["username"].clone()).collect();
        assert_eq!(names, vec![json!("alice"), json!("bob")]);
        assert!(users.iter().all(|u| u.get("password_hash").is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn edit_user_changes_password_of_caller_only() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let alice = register_and_login(&server, "alice", "pw1").await;
        register_and_login(&server, "bob", "pw2").await;

        server
            .put("/edit-user")
            .add_cookie(alice)
            .json(&json!({ "username": "bob", "password": "new-pw" }))
            .await
            .assert_status_ok();

        server
            .post("/login")
            .json(&json!({ "username": "alice", "password": "new-pw" }))
            .await
            .assert_status_ok();
        server
            .post("/login")
            .json(&json!({ "username": "bob", "password": "pw2" }))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn edit_user_sets_and_clears_email() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        let response = server
            .put("/edit-user")
            .add_cookie(cookie.clone())
            .json(&json!({ "email": "alice@example.com" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["email"], "alice@example.com");

        let response = server
            .put("/edit-user")
            .add_cookie(cookie)
            .json(&json!({ "email": "" }))
            .await;
        response.assert_status_ok();
        assert!(response.json::<Value>().get("email").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn delete_user_removes_caller() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        server
            .delete("/delete-user")
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        server
            .post("/login")
            .json(&json!({ "username": "alice", "password": "pw1" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        // The token is still valid, but the account is gone.
        server
            .delete("/delete-user")
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }
}
