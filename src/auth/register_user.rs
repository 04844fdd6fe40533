//! The registration endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use email_address::{EmailAddress, Options};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, TokenKeys, ValidatedPassword, create_user},
    ledger::Account,
};

/// The state needed to register a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for creating the user.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys used to sign the token returned to the new user.
    pub token_keys: TokenKeys,
    /// The bcrypt cost used to hash the user's password.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The email and password sent to register or log in.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// The user's email address.
    pub email: String,
    /// The user's raw password.
    pub password: String,
}

/// The body returned after a successful registration or log-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The user's account, including their current balance.
    pub user: Account,
    /// A bearer token for the protected routes.
    pub token: String,
}

/// Register a new user with a zero balance and return a token for them.
///
/// # Errors
///
/// Returns an error if:
/// - the email is not a valid email address,
/// - the password is too weak,
/// - the email is already registered,
/// - or an internal error occurred.
pub async fn register_user(
    State(state): State<RegistrationState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let Json(credentials) = payload?;

    let email = EmailAddress::parse_with_options(
        credentials.email.trim(),
        Options::default().without_display_text(),
    )
    .map_err(|_| Error::InvalidEmail(credentials.email.clone()))?;
    let password = ValidatedPassword::new(
        &credentials.password,
        &[email.as_str(), email.local_part()],
    )?;
    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(email, password_hash, &connection)?
    };

    let token = state.token_keys.issue(user.id)?;

    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: Account {
                id: user.id,
                email: user.email.to_string(),
                balance: 0,
            },
            token,
        }),
    ))
}
