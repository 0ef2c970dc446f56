//! User repository for identity records.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewUser, UpdateUser, User};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for user database operations.
pub trait UserRepository {
    /// Inserts a new user.
    ///
    /// Fails with a unique violation on `users_username_key` when the
    /// username is taken.
    fn create_user(&mut self, new_user: NewUser) -> impl Future<Output = PgResult<User>> + Send;

    /// Finds a user by exact username.
    fn find_user_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Applies profile changes. Returns `None` if no such user exists.
    fn update_user(
        &mut self,
        username: &str,
        changes: UpdateUser,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Deletes a user. Returns whether a row was removed.
    fn delete_user(&mut self, username: &str) -> impl Future<Output = PgResult<bool>> + Send;

    /// Lists all users ordered by id.
    fn list_users(&mut self) -> impl Future<Output = PgResult<Vec<User>>> + Send;
}

impl UserRepository for PgConnection {
    async fn create_user(&mut self, new_user: NewUser) -> PgResult<User> {
        use schema::users;

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_user_by_username(&mut self, username: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::username.eq(username))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_user(&mut self, username: &str, changes: UpdateUser) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        // An empty changeset is a query builder error in diesel.
        if changes.is_empty() {
            return self.find_user_by_username(username).await;
        }

        diesel::update(users::table.filter(dsl::username.eq(username)))
            .set(&changes)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn delete_user(&mut self, username: &str) -> PgResult<bool> {
        use schema::users::{self, dsl};

        let deleted = diesel::delete(users::table.filter(dsl::username.eq(username)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, deleted, "Deleted user rows");
        Ok(deleted > 0)
    }

    async fn list_users(&mut self) -> PgResult<Vec<User>> {
        use schema::users::{self, dsl};

        users::table
            .order(dsl::id.asc())
            .select(User::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
