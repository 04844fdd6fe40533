//! The log-in endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{AuthResponse, Credentials, TokenKeys, get_user_by_email},
    ledger::get_account,
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys used to sign the returned token.
    pub token_keys: TokenKeys,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
        }
    }
}

/// Check the user's credentials and return their account with a fresh token.
///
/// An unknown email and a wrong password are reported with the same error.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the email or password is wrong, or
/// an internal error if the password could not be checked.
pub async fn log_in(
    State(state): State<LoginState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, Error> {
    let Json(credentials) = payload?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_email(credentials.email.trim(), &connection).map_err(|error| {
        match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        }
    })?;

    if !user.password_hash.verify(&credentials.password)? {
        tracing::warn!("Failed log-in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let account = get_account(user.id, &connection)?;
    let token = state.token_keys.issue(user.id)?;

    Ok(Json(AuthResponse {
        user: account,
        token,
    }))
}
