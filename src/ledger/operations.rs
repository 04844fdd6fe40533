//! The balance operations: fund, withdraw and transfer.
//!
//! Each operation runs inside one SQLite transaction opened with `BEGIN IMMEDIATE`.
//! The write lock is taken before the first read, so no other writer can change a
//! balance between the check and the update. The transaction record is appended
//! inside the same transaction, and an early return drops the transaction, which
//! rolls back every change made so far.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    auth::UserID,
    ledger::{
        Account, Amount, Transaction,
        account::{credit, debit, get_account, get_account_by_email},
        transaction::{NewTransaction, append_transaction, get_transactions_for_user},
    },
};

/// The result of a fund or withdraw operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// The actor's account after the operation.
    pub account: Account,
    /// The record of the operation.
    pub transaction: Transaction,
}

/// The result of a transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    /// The sender's account after the transfer.
    pub sender: Account,
    /// The receiver's account after the transfer.
    pub receiver: Account,
    /// The record of the transfer.
    pub transaction: Transaction,
}

fn begin(connection: &Connection) -> Result<SqlTransaction<'_>, Error> {
    // Unchecked because the handlers only hold a `&Connection` from the mutex guard.
    SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate).map_err(Error::from)
}

fn not_found_as(replacement: Error) -> impl FnOnce(Error) -> Error {
    move |error| match error {
        Error::NotFound => replacement,
        error => error,
    }
}

/// Add `amount` to the balance of `actor` and record a `fund` transaction.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidAmount] if `amount` is not positive.
/// - [Error::ActorNotFound] if `actor` has no account.
/// - [Error::BalanceOverflow] if the balance would overflow.
/// - [Error::StoreUnavailable] or [Error::SqlError] if the store failed, in
///   which case nothing is changed.
pub fn fund(actor: UserID, amount: i64, connection: &Connection) -> Result<Receipt, Error> {
    let amount = Amount::new(amount)?;

    let transaction = begin(connection)?;
    let account = credit(actor, amount, &transaction).map_err(not_found_as(Error::ActorNotFound))?;
    let record = append_transaction(NewTransaction::fund(actor, amount), &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "User {} funded {} (transaction {})",
        actor,
        amount.as_i64(),
        record.id
    );

    Ok(Receipt {
        account,
        transaction: record,
    })
}

/// Subtract `amount` from the balance of `actor` and record a `withdraw` transaction.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidAmount] if `amount` is not positive.
/// - [Error::ActorNotFound] if `actor` has no account.
/// - [Error::InsufficientBalance] if the balance is less than `amount`.
/// - [Error::StoreUnavailable] or [Error::SqlError] if the store failed, in
///   which case nothing is changed.
pub fn withdraw(actor: UserID, amount: i64, connection: &Connection) -> Result<Receipt, Error> {
    let amount = Amount::new(amount)?;

    let transaction = begin(connection)?;
    let account = debit(actor, amount, &transaction)
        .map_err(not_found_as(Error::ActorNotFound))
        .inspect_err(|error| {
            if *error == Error::InsufficientBalance {
                tracing::warn!(
                    "User {} cannot withdraw {}: insufficient balance",
                    actor,
                    amount.as_i64()
                );
            }
        })?;
    let record = append_transaction(NewTransaction::withdraw(actor, amount), &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "User {} withdrew {} (transaction {})",
        actor,
        amount.as_i64(),
        record.id
    );

    Ok(Receipt {
        account,
        transaction: record,
    })
}

/// Move `amount` from the balance of `actor` to the user registered with
/// `recipient_email` and record one `transfer` transaction.
///
/// Checks happen in this order: amount, actor, recipient, self-transfer, balance.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidAmount] if `amount` is not positive.
/// - [Error::SenderNotFound] if `actor` has no account.
/// - [Error::RecipientNotFound] if no user is registered with `recipient_email`.
/// - [Error::SelfTransfer] if the recipient is the actor.
/// - [Error::InsufficientBalance] if the actor's balance is less than `amount`.
/// - [Error::BalanceOverflow] if the recipient's balance would overflow.
/// - [Error::StoreUnavailable] or [Error::SqlError] if the store failed.
///
/// Neither balance changes when an error is returned.
pub fn transfer(
    actor: UserID,
    recipient_email: &str,
    amount: i64,
    connection: &Connection,
) -> Result<TransferReceipt, Error> {
    let amount = Amount::new(amount)?;

    let transaction = begin(connection)?;

    let sender = get_account(actor, &transaction).map_err(not_found_as(Error::SenderNotFound))?;
    let recipient = get_account_by_email(recipient_email.trim(), &transaction)
        .map_err(not_found_as(Error::RecipientNotFound))?;

    if sender.id == recipient.id {
        tracing::warn!("User {} tried to transfer funds to themselves", actor);
        return Err(Error::SelfTransfer);
    }

    let sender = debit(sender.id, amount, &transaction)
        .map_err(not_found_as(Error::SenderNotFound))
        .inspect_err(|error| {
            if *error == Error::InsufficientBalance {
                tracing::warn!(
                    "User {} cannot transfer {} to user {}: insufficient balance",
                    actor,
                    amount.as_i64(),
                    recipient.id
                );
            }
        })?;
    let receiver =
        credit(recipient.id, amount, &transaction).map_err(not_found_as(Error::RecipientNotFound))?;
    let record = append_transaction(
        NewTransaction::transfer(sender.id, receiver.id, amount),
        &transaction,
    )?;
    transaction.commit()?;

    tracing::info!(
        "User {} transferred {} to user {} (transaction {})",
        sender.id,
        amount.as_i64(),
        receiver.id,
        record.id
    );

    Ok(TransferReceipt {
        sender,
        receiver,
        transaction: record,
    })
}

/// Get the transactions that `actor` sent or received, newest first.
///
/// # Errors
///
/// Returns [Error::ActorNotFound] if `actor` has no account, or a store error.
pub fn history(actor: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    get_account(actor, connection).map_err(not_found_as(Error::ActorNotFound))?;

    get_transactions_for_user(actor, connection)
}
