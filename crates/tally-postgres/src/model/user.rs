//! User identity model.

use diesel::prelude::*;

use crate::schema::users;

/// A registered identity.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Store-assigned identifier.
    pub id: i32,
    /// Unique, immutable login name.
    pub username: String,
    /// Optional contact address.
    pub email: Option<String>,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// Profile changes; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateUser {
    pub email: Option<Option<String>>,
    pub password_hash: Option<String>,
}

impl UpdateUser {
    /// Returns `true` if applying this changeset would not modify anything.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none()
    }
}
