use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    accounts::LedgerState,
    auth::Actor,
    ledger::{Account, Transaction, transfer},
};

/// The request body for a transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// The email of the user receiving the money.
    pub recipient_email: String,
    /// The amount in minor currency units.
    pub amount: i64,
}

/// The response body after a successful transfer.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    /// A confirmation message.
    pub message: String,
    /// The caller's account after the transfer.
    pub sender: Account,
    /// The recipient's account after the transfer.
    pub receiver: Account,
    /// The record of the transfer.
    pub transaction: Transaction,
}

/// A route handler for moving money from the caller's account to another user's account.
pub async fn transfer_endpoint(
    State(state): State<LedgerState>,
    Actor(actor): Actor,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, Error> {
    let Json(request) = payload?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let receipt = transfer(actor, &request.recipient_email, request.amount, &connection)?;

    Ok(Json(TransferResponse {
        message: "Transfer successful.".to_owned(),
        sender: receipt.sender,
        receiver: receipt.receiver,
        transaction: receipt.transaction,
    }))
}
