//! The append-only log of fund, withdraw and transfer records.

use std::fmt::Display;

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, ledger::Amount};

/// A newtype wrapper for integer transaction IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TransactionID(i64);

impl TransactionID {
    /// Create a new transaction ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the transaction ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for TransactionID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What kind of balance change a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money added to the sender's account from outside the ledger.
    Fund,
    /// Money taken out of the sender's account.
    Withdraw,
    /// Money moved from the sender's account to the receiver's account.
    Transfer,
}

impl TransactionKind {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Fund => "fund",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Transfer => "transfer",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "fund" => Some(TransactionKind::Fund),
            "withdraw" => Some(TransactionKind::Withdraw),
            "transfer" => Some(TransactionKind::Transfer),
            _ => None,
        }
    }
}

/// The outcome of a transaction.
///
/// Only completed transactions are ever written: a rejected operation leaves
/// no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The transaction has not been applied yet.
    Pending,
    /// The transaction was applied to the balances.
    Completed,
    /// The transaction could not be applied.
    Failed,
}

impl TransactionStatus {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// A record of a balance change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// The kind of balance change.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// How much money was moved.
    pub amount: Amount,
    /// The user who initiated the change.
    pub sender: UserID,
    /// The user who received the money. Only set for transfers.
    pub receiver: Option<UserID>,
    /// The outcome of the transaction.
    pub status: TransactionStatus,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A transaction that has not been written to the log yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    kind: TransactionKind,
    amount: Amount,
    sender: UserID,
    receiver: Option<UserID>,
}

impl NewTransaction {
    /// A deposit of `amount` into the account of `sender`.
    pub fn fund(sender: UserID, amount: Amount) -> Self {
        Self {
            kind: TransactionKind::Fund,
            amount,
            sender,
            receiver: None,
        }
    }

    /// A withdrawal of `amount` from the account of `sender`.
    pub fn withdraw(sender: UserID, amount: Amount) -> Self {
        Self {
            kind: TransactionKind::Withdraw,
            amount,
            sender,
            receiver: None,
        }
    }

    /// A transfer of `amount` from `sender` to `receiver`.
    pub fn transfer(sender: UserID, receiver: UserID, amount: Amount) -> Self {
        Self {
            kind: TransactionKind::Transfer,
            amount,
            sender,
            receiver: Some(receiver),
        }
    }
}

/// Create the transaction table.
///
/// A transfer always has a receiver and no other kind of transaction does.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                type TEXT NOT NULL CHECK (type IN ('fund', 'withdraw', 'transfer')),
                amount INTEGER NOT NULL CHECK (amount > 0),
                sender_id INTEGER NOT NULL,
                receiver_id INTEGER,
                status TEXT NOT NULL DEFAULT 'completed'
                    CHECK (status IN ('pending', 'completed', 'failed')),
                created_at TEXT NOT NULL,
                FOREIGN KEY(sender_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(receiver_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                CHECK ((type = 'transfer') = (receiver_id IS NOT NULL))
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_sender ON \"transaction\"(sender_id)",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_receiver ON \"transaction\"(receiver_id)",
        (),
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_kind: String = row.get(1)?;
    let raw_amount: i64 = row.get(2)?;
    let raw_receiver: Option<i64> = row.get(4)?;
    let raw_status: String = row.get(5)?;

    let kind = TransactionKind::parse(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown transaction type {raw_kind:?}").into(),
        )
    })?;
    let amount = Amount::new(raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(error))
    })?;
    let status = TransactionStatus::parse(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown transaction status {raw_status:?}").into(),
        )
    })?;

    Ok(Transaction {
        id: TransactionID::new(row.get(0)?),
        kind,
        amount,
        sender: UserID::new(row.get(3)?),
        receiver: raw_receiver.map(UserID::new),
        status,
        created_at: row.get(6)?,
    })
}

/// Append a completed transaction to the log and return the stored record.
///
/// # Errors
///
/// Returns [Error::SqlError] if the record could not be written, e.g. because
/// a referenced user does not exist.
pub fn append_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (type, amount, sender_id, receiver_id, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, type, amount, sender_id, receiver_id, status, created_at",
        )?
        .query_row(
            (
                transaction.kind.as_str(),
                transaction.amount.as_i64(),
                transaction.sender.as_i64(),
                transaction.receiver.map(|receiver| receiver.as_i64()),
                TransactionStatus::Completed.as_str(),
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Get the transactions that `user_id` sent or received, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, type, amount, sender_id, receiver_id, status, created_at
            FROM \"transaction\"
            WHERE sender_id = :user_id OR receiver_id = :user_id
            ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, User, UserID, create_user},
        db::initialize,
        ledger::{
            Amount,
            transaction::{
                NewTransaction, Transaction, TransactionKind, TransactionStatus,
                append_transaction, get_transactions_for_user,
            },
        },
    };

    fn get_test_connection() -> (Connection, User, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let alice = create_user(
            EmailAddress::from_str("alice@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let bob = create_user(
            EmailAddress::from_str("bob@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, alice, bob)
    }

    #[test]
    fn append_returns_completed_record() {
        let (connection, alice, bob) = get_test_connection();
        let amount = Amount::new(250).unwrap();

        let transaction =
            append_transaction(NewTransaction::transfer(alice.id, bob.id, amount), &connection)
                .unwrap();

        assert!(transaction.id.as_i64() > 0);
        assert_eq!(transaction.kind, TransactionKind::Transfer);
        assert_eq!(transaction.amount, amount);
        assert_eq!(transaction.sender, alice.id);
        assert_eq!(transaction.receiver, Some(bob.id));
        assert_eq!(transaction.status, TransactionStatus::Completed);
    }

    #[test]
    fn append_fails_on_unknown_sender() {
        let (connection, _, _) = get_test_connection();

        let result = append_transaction(
            NewTransaction::fund(UserID::new(999), Amount::new(1).unwrap()),
            &connection,
        );

        assert!(result.is_err());
    }

    #[test]
    fn history_includes_sent_and_received_newest_first() {
        let (connection, alice, bob) = get_test_connection();
        let amount = Amount::new(10).unwrap();
        let fund = append_transaction(NewTransaction::fund(alice.id, amount), &connection).unwrap();
        let transfer =
            append_transaction(NewTransaction::transfer(alice.id, bob.id, amount), &connection)
                .unwrap();
        let withdraw =
            append_transaction(NewTransaction::withdraw(bob.id, amount), &connection).unwrap();

        let alice_history = get_transactions_for_user(alice.id, &connection).unwrap();
        let bob_history = get_transactions_for_user(bob.id, &connection).unwrap();

        assert_eq!(alice_history, vec![transfer.clone(), fund]);
        assert_eq!(bob_history, vec![withdraw, transfer]);
    }

    #[test]
    fn serializes_kind_as_type() {
        let (connection, alice, _) = get_test_connection();
        let transaction = append_transaction(
            NewTransaction::withdraw(alice.id, Amount::new(5).unwrap()),
            &connection,
        )
        .unwrap();

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["type"], "withdraw");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["amount"], 5);
        assert_eq!(json["receiver"], serde_json::Value::Null);
        assert!(json["createdAt"].is_string());

        let round_trip: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(round_trip, transaction);
    }
}
