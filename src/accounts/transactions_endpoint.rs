use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    accounts::LedgerState,
    auth::Actor,
    ledger::{Transaction, history},
};

/// The response body containing the caller's transactions.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    /// The transactions the caller sent or received, newest first.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing the caller's transactions.
pub async fn get_transactions_endpoint(
    State(state): State<LedgerState>,
    Actor(actor): Actor,
) -> Result<Json<TransactionsResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = history(actor, &connection)?;

    Ok(Json(TransactionsResponse { transactions }))
}
