use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    accounts::LedgerState,
    auth::Actor,
    ledger::{Account, get_account},
};

/// The response body containing the caller's account.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    /// The caller's account and current balance.
    pub user: Account,
}

/// A route handler for getting the caller's account and current balance.
pub async fn get_me_endpoint(
    State(state): State<LedgerState>,
    Actor(actor): Actor,
) -> Result<Json<AccountResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_account(actor, &connection).map_err(|error| match error {
        Error::NotFound => Error::ActorNotFound,
        error => error,
    })?;

    Ok(Json(AccountResponse { user }))
}
