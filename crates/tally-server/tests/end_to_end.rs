//! Full request flow over the in-memory backend: register, log in, record
//! an expense and read it back, with a second identity looking on.

use axum::http::header::COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{Value, json};
use tally_server::extract::SESSION_COOKIE;
use tally_server::handler::{ServiceKind, routes};
use tally_server::service::store::MemoryBackend;
use tally_server::service::{MIN_SECRET_LEN, ServiceConfig, ServiceState};

fn server() -> anyhow::Result<TestServer> {
    let config = ServiceConfig::builder()
        .with_auth_signing_secret("e".repeat(MIN_SECRET_LEN))
        .build()?;
    let state = ServiceState::with_backend(MemoryBackend::new(), &config)?;
    Ok(TestServer::new(routes(ServiceKind::Combined).with_state(state))?)
}

#[tokio::test]
async fn alice_sees_her_expense_and_bob_sees_nothing() -> anyhow::Result<()> {
    let server = server()?;

    server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "pw1" }))
        .await
        .assert_status_ok();

    let login = server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "pw1" }))
        .await;
    login.assert_status_ok();
    let alice = login.cookie(SESSION_COOKIE);

    server
        .post("/add-expense")
        .add_cookie(alice.clone())
        .json(&json!({ "description": "desc", "amount": "12.50", "date": "2024-01-01" }))
        .await
        .assert_status_ok();

    let expenses = server
        .get("/get-expenses")
        .add_cookie(alice)
        .await
        .json::<Vec<Value>>();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0]["description"], "desc");
    assert_eq!(expenses[0]["amount"], "12.50");
    assert_eq!(expenses[0]["username"], "alice");

    // Bob has no session yet.
    server
        .get("/get-expenses")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/register")
        .json(&json!({ "username": "bob", "password": "pw2" }))
        .await
        .assert_status_ok();
    let bob = server
        .post("/login")
        .json(&json!({ "username": "bob", "password": "pw2" }))
        .await
        .cookie(SESSION_COOKIE);

    let expenses = server
        .get("/get-expenses")
        .add_cookie(bob)
        .await
        .json::<Vec<Value>>();
    assert!(expenses.is_empty());
    Ok(())
}

#[tokio::test]
async fn forged_cookie_is_rejected() -> anyhow::Result<()> {
    let server = server()?;

    let response = server
        .get("/get-expenses")
        .add_header(
            COOKIE,
            HeaderValue::from_static("token=eyJhbGciOiJIUzI1NiJ9.e30.c2lnbmF0dXJl"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
