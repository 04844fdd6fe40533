//! The endpoints for reading and changing the caller's account.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    ledger::{Account, Receipt, Transaction},
};

mod fund_endpoint;
mod me_endpoint;
mod transactions_endpoint;
mod transfer_endpoint;
mod withdraw_endpoint;

pub use fund_endpoint::fund_endpoint;
pub use me_endpoint::get_me_endpoint;
pub use transactions_endpoint::get_transactions_endpoint;
pub use transfer_endpoint::transfer_endpoint;
pub use withdraw_endpoint::withdraw_endpoint;

/// The state needed by the account endpoints.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The database connection for reading and changing balances.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for funding or withdrawing.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    /// The amount in minor currency units.
    pub amount: i64,
}

/// The response body after funding or withdrawing.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// The caller's account after the change.
    pub user: Account,
    /// The record of the change.
    pub transaction: Transaction,
}

impl From<Receipt> for BalanceResponse {
    fn from(receipt: Receipt) -> Self {
        Self {
            user: receipt.account,
            transaction: receipt.transaction,
        }
    }
}
