//! Reading and changing account balances.
//!
//! The credit and debit helpers change a balance with a single conditional
//! `UPDATE`, so the check and the write happen in one statement. They are meant
//! to be called inside the transactions opened by [crate::ledger::operations].

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, ledger::Amount};

/// The public view of a user: their ID, email and current balance.
///
/// The password hash is never part of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the user who owns the account.
    pub id: UserID,
    /// The user's email address.
    pub email: String,
    /// The balance in minor currency units. Never negative.
    pub balance: i64,
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        balance: row.get(2)?,
    })
}

/// Get the account of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user, or [Error::SqlError] if
/// another SQL related error occurred.
pub fn get_account(user_id: UserID, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, email, balance FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_account_row)
        .map_err(|error| error.into())
}

/// Get the account registered with `email`, ignoring case.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user, or [Error::SqlError] if
/// another SQL related error occurred.
pub fn get_account_by_email(email: &str, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, email, balance FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_account_row)
        .map_err(|error| error.into())
}

fn account_exists(user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT 1 FROM user WHERE id = ?1",
            [user_id.as_i64()],
            |_| Ok(()),
        )
        .optional()
        .map(|row| row.is_some())
        .map_err(Error::from)
}

/// Add `amount` to the balance of `user_id` and return the updated account.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if there is no such user.
/// - [Error::BalanceOverflow] if the new balance would not fit in an `i64`.
pub fn credit(user_id: UserID, amount: Amount, connection: &Connection) -> Result<Account, Error> {
    let updated = connection
        .prepare(
            "UPDATE user SET balance = balance + ?1
            WHERE id = ?2 AND balance <= ?3
            RETURNING id, email, balance",
        )?
        .query_row(
            (
                amount.as_i64(),
                user_id.as_i64(),
                i64::MAX - amount.as_i64(),
            ),
            map_account_row,
        )
        .optional()?;

    match updated {
        Some(account) => Ok(account),
        None if account_exists(user_id, connection)? => Err(Error::BalanceOverflow),
        None => Err(Error::NotFound),
    }
}

/// Subtract `amount` from the balance of `user_id` and return the updated account.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if there is no such user.
/// - [Error::InsufficientBalance] if the balance is less than `amount`.
pub fn debit(user_id: UserID, amount: Amount, connection: &Connection) -> Result<Account, Error> {
    let updated = connection
        .prepare(
            "UPDATE user SET balance = balance - ?1
            WHERE id = ?2 AND balance >= ?1
            RETURNING id, email, balance",
        )?
        .query_row((amount.as_i64(), user_id.as_i64()), map_account_row)
        .optional()?;

    match updated {
        Some(account) => Ok(account),
        None if account_exists(user_id, connection)? => Err(Error::InsufficientBalance),
        None => Err(Error::NotFound),
    }
}
