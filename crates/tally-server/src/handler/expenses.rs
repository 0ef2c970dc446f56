//! Owner-scoped expense handlers.
//!
//! The owner passed to the [`ExpenseStore`] is always the username from
//! [`AuthSession`]. Updates and deletes that match nothing owned by the
//! caller still answer `200`, so callers learn nothing about other owners'
//! records.

use axum::Router;
use axum::extract::State;
use axum::routing::{delete, get, post, put};

use super::request::{AddExpense, DeleteExpense, UpdateExpense};
use super::response::{Acknowledgement, Expense};
use crate::extract::{AuthSession, Json, ValidateJson};
use crate::handler::Result;
use crate::service::{ExpenseDraft, ExpenseStore, ServiceState};

/// Tracing target for expense operations.
const TRACING_TARGET: &str = "tally_server::handler::expenses";

/// Records a new expense for the caller.
#[tracing::instrument(skip_all)]
async fn add_expense(
    State(expenses): State<ExpenseStore>,
    auth_session: AuthSession,
    ValidateJson(request): ValidateJson<AddExpense>,
) -> Result<Json<Expense>> {
    let draft = ExpenseDraft {
        occurred_at: request.occurred_at(),
        description: request.description,
        amount: request.amount,
    };

    let record = expenses.create(auth_session.username(), draft).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        expense_id = record.id,
        "Expense added"
    );

    Ok(Json(record.into()))
}

/// Lists the caller's expenses, oldest first.
#[tracing::instrument(skip_all)]
async fn get_expenses(
    State(expenses): State<ExpenseStore>,
    auth_session: AuthSession,
) -> Result<Json<Vec<Expense>>> {
    let records = expenses.list(auth_session.username()).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = records.len(),
        "Expenses listed"
    );

    Ok(Json(records.into_iter().map(Expense::from).collect()))
}

/// Replaces the fields of one of the caller's expenses.
#[tracing::instrument(skip_all)]
async fn update_expense(
    State(expenses): State<ExpenseStore>,
    auth_session: AuthSession,
    ValidateJson(request): ValidateJson<UpdateExpense>,
) -> Result<Json<Acknowledgement>> {
    let occurred_at = request.occurred_at();
    expenses
        .update(
            auth_session.username(),
            request.id,
            request.description,
            request.amount,
            occurred_at,
        )
        .await?;

    Ok(Json(Acknowledgement::new("Expense updated")))
}

/// Deletes one of the caller's expenses. Repeating it is harmless.
#[tracing::instrument(skip_all)]
async fn delete_expense(
    State(expenses): State<ExpenseStore>,
    auth_session: AuthSession,
    Json(request): Json<DeleteExpense>,
) -> Result<Json<Acknowledgement>> {
    expenses
        .delete(auth_session.username(), request.id())
        .await?;

    Ok(Json(Acknowledgement::new("Expense deleted")))
}

/// Returns a [`Router`] with the expense routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/add-expense", post(add_expense))
        .route("/get-expenses", get(get_expenses))
        .route("/update-expense", put(update_expense))
        .route("/delete-expense", delete(delete_expense))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::handler::test::{create_test_server, register_and_login};

    #[tokio::test]
    async fn routes_require_session() -> anyhow::Result<()> {
        let server = create_test_server()?;

        server
            .get("/get-expenses")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/add-expense")
            .json(&json!({ "description": "desc", "amount": "1.00" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn add_then_list() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        let response = server
            .post("/add-expense")
            .add_cookie(cookie.clone())
            .json(&json!({ "description": "coffee", "amount": 3.456, "date": "2024-03-01" }))
            .await;
        response.assert_status_ok();
        let created = response.json::<Value>();
        assert_eq!(created["amount"], "3.46");
        assert_eq!(created["date"], "2024-03-01T00:00:00Z");

        let listed = server
            .get("/get-expenses")
            .add_cookie(cookie)
            .await
            .json::<Vec<Value>>();
        assert_eq!(listed, vec![created]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_date_is_stamped() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        let response = server
            .post("/add-expense")
            .add_cookie(cookie)
            .json(&json!({ "description": "lunch", "amount": "9" }))
            .await;
        response.assert_status_ok();

        let date = response.json::<Value>()["date"].as_str().unwrap_or_default().to_owned();
        assert!(date.parse::<jiff::Timestamp>().is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn bad_payloads_are_rejected() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        for payload in [
            json!({ "description": "x", "amount": "abc" }),
            json!({ "description": "x", "amount": "1", "date": "tomorrow" }),
            json!({ "description": "", "amount": "1" }),
            json!({ "description": "x", "amount": "100000000" }),
        ] {
            server
                .post("/add-expense")
                .add_cookie(cookie.clone())
                .json(&payload)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }
        Ok(())
    }

    #[tokio::test]
    async fn extreme_exponents_fail_fast() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        let created = server
            .post("/add-expense")
            .add_cookie(cookie.clone())
            .json(&json!({ "description": "x", "amount": "1" }))
            .await
            .json::<Value>();

        for amount in ["1e100000000", "1e-100000000"] {
            let added = server
                .post("/add-expense")
                .add_cookie(cookie.clone())
                .json(&json!({ "description": "x", "amount": amount }));
            let response = tokio::time::timeout(Duration::from_secs(5), added).await?;
            response.assert_status(StatusCode::BAD_REQUEST);

            let updated = server
                .put("/update-expense")
                .add_cookie(cookie.clone())
                .json(&json!({ "id": created["id"], "description": "x", "amount": amount }));
            let response = tokio::time::timeout(Duration::from_secs(5), updated).await?;
            response.assert_status(StatusCode::BAD_REQUEST);
        }
        Ok(())
    }

    #[tokio::test]
    async fn payload_username_cannot_pick_owner() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let alice = register_and_login(&server, "alice", "pw1").await;
        let bob = register_and_login(&server, "bob", "pw2").await;

        server
            .post("/add-expense")
            .add_cookie(alice)
            .json(&json!({ "username": "bob", "description": "x", "amount": "1" }))
            .await
            .assert_status_ok();

        let bobs = server
            .get("/get-expenses?username=alice")
            .add_cookie(bob)
            .await
            .json::<Vec<Value>>();
        assert!(bobs.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn other_owner_cannot_update_or_delete() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let alice = register_and_login(&server, "alice", "pw1").await;
        let bob = register_and_login(&server, "bob", "pw2").await;

        let created = server
            .post("/add-expense")
            .add_cookie(alice.clone())
            .json(&json!({ "description": "rent", "amount": "800", "date": "2024-02-01" }))
            .await
            .json::<Value>();
        let id = created["id"].clone();

        server
            .put("/update-expense")
            .add_cookie(bob.clone())
            .json(&json!({ "id": id, "description": "hacked", "amount": "0" }))
            .await
            .assert_status_ok();
        server
            .delete("/delete-expense")
            .add_cookie(bob)
            .json(&json!({ "id": id }))
            .await
            .assert_status_ok();

        let listed = server
            .get("/get-expenses")
            .add_cookie(alice)
            .await
            .json::<Vec<Value>>();
        assert_eq!(listed, vec![created]);
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_date_when_absent() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        let created = server
            .post("/add-expense")
            .add_cookie(cookie.clone())
            .json(&json!({ "description": "book", "amount": "20", "date": "2024-01-15" }))
            .await
            .json::<Value>();

        server
            .put("/update-expense")
            .add_cookie(cookie.clone())
            .json(&json!({ "id": created["id"], "description": "books", "amount": "25.5" }))
            .await
            .assert_status_ok();

        let listed = server
            .get("/get-expenses")
            .add_cookie(cookie)
            .await
            .json::<Vec<Value>>();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["description"], "books");
        assert_eq!(listed[0]["amount"], "25.50");
        assert_eq!(listed[0]["date"], "2024-01-15T00:00:00Z");
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let cookie = register_and_login(&server, "alice", "pw1").await;

        for description in ["a", "b"] {
            server
                .post("/add-expense")
                .add_cookie(cookie.clone())
                .json(&json!({ "description": description, "amount": "1" }))
                .await
                .assert_status_ok();
        }

        for _ in 0..2 {
            server
                .delete("/delete-expense")
                .add_cookie(cookie.clone())
                .json(&json!(1))
                .await
                .assert_status_ok();
        }

        let listed = server
            .get("/get-expenses")
            .add_cookie(cookie)
            .await
            .json::<Vec<Value>>();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["description"], "b");
        Ok(())
    }
}
