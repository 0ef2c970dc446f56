//! Expense request types.
//!
//! None of these carry an owner: the owner is always the username verified
//! by [`AuthSession`]. A `username` field sent by a client is ignored.
//!
//! [`AuthSession`]: crate::extract::AuthSession

use bigdecimal::BigDecimal;
use jiff::Timestamp;
use serde::Deserialize;
use validator::Validate;

use super::{is_date, is_not_blank, parse_date};

/// Request payload for a new expense.
///
/// `amount` may be a JSON number or a decimal string. `date` is optional;
/// the server stamps the current time when it is absent or blank.
#[must_use]
#[derive(Debug, Deserialize, Validate)]
pub struct AddExpense {
    #[validate(length(min = 1, max = 1000), custom(function = "is_not_blank"))]
    pub description: String,

    pub amount: BigDecimal,

    #[serde(default)]
    #[validate(custom(function = "is_date"))]
    pub date: Option<String>,
}

impl AddExpense {
    /// Returns the parsed date, if one was given.
    pub fn occurred_at(&self) -> Option<Timestamp> {
        self.date.as_deref().and_then(parse_date)
    }
}

/// Request payload for replacing an expense's fields.
///
/// A missing or blank `date` keeps the stored one.
#[must_use]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExpense {
    pub id: i32,

    #[validate(length(min = 1, max = 1000), custom(function = "is_not_blank"))]
    pub description: String,

    pub amount: BigDecimal,

    #[serde(default)]
    #[validate(custom(function = "is_date"))]
    pub date: Option<String>,
}

impl UpdateExpense {
    /// Returns the parsed date, if one was given.
    pub fn occurred_at(&self) -> Option<Timestamp> {
        self.date.as_deref().and_then(parse_date)
    }
}

/// Request payload for deleting an expense: `{"id": 7}` or just `7`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DeleteExpense {
    Object { id: i32 },
    Bare(i32),
}

impl DeleteExpense {
    /// Returns the id of the expense to delete.
    #[inline]
    pub fn id(self) -> i32 {
        match self {
            Self::Object { id } | Self::Bare(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn amount_accepts_string_and_number() -> anyhow::Result<()> {
        let from_string: AddExpense = serde_json::from_value(json!({
            "description": "desc",
            "amount": "12.50",
            "date": "2024-01-01",
        }))?;
        let from_number: AddExpense = serde_json::from_value(json!({
            "description": "desc",
            "amount": 12.5,
        }))?;

        assert_eq!(from_string.amount, BigDecimal::from_str("12.50")?);
        assert_eq!(from_number.amount, BigDecimal::from_str("12.5")?);
        assert!(from_string.occurred_at().is_some());
        assert!(from_number.occurred_at().is_none());
        Ok(())
    }

    #[test]
    fn username_in_payload_is_ignored() -> anyhow::Result<()> {
        let request: AddExpense = serde_json::from_value(json!({
            "username": "mallory",
            "description": "desc",
            "amount": 1,
        }))?;

        assert!(request.validate().is_ok());
        Ok(())
    }

    #[test]
    fn bad_date_fails_validation() -> anyhow::Result<()> {
        let request: UpdateExpense = serde_json::from_value(json!({
            "id": 1,
            "description": "desc",
            "amount": "1.00",
            "date": "next tuesday",
        }))?;

        assert!(request.validate().is_err());
        Ok(())
    }

    #[test]
    fn delete_accepts_object_or_bare_id() -> anyhow::Result<()> {
        let object: DeleteExpense = serde_json::from_value(json!({ "id": 7 }))?;
        let bare: DeleteExpense = serde_json::from_value(json!(7))?;

        assert_eq!(object.id(), 7);
        assert_eq!(bare.id(), 7);
        Ok(())
    }
}
