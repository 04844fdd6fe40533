//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{PasswordHash, SharedResolver, TokenKeys},
    db::initialize,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys for signing and verifying bearer tokens.
    pub token_keys: TokenKeys,

    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection and the secret for signing
    /// bearer tokens.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, token_secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            token_keys: TokenKeys::new(token_secret),
            password_cost: PasswordHash::DEFAULT_COST,
        })
    }

    /// Set how long newly issued tokens stay valid.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_keys = self.token_keys.with_token_duration(token_duration);
        self
    }

    /// Set the bcrypt cost for hashing new passwords.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }
}

// this impl tells the `Actor` extractor how to verify tokens with our state
impl FromRef<AppState> for SharedResolver {
    fn from_ref(state: &AppState) -> Self {
        Arc::new(state.token_keys.clone())
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::FromRef;
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        AppState,
        auth::{SharedResolver, UserID},
    };

    #[test]
    fn resolver_accepts_tokens_from_state_keys() {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "foobar").unwrap();
        let token = state.token_keys.issue(UserID::new(3)).unwrap();

        let resolver = SharedResolver::from_ref(&state);

        assert_eq!(resolver.resolve_token(&token), Ok(UserID::new(3)));
    }

    #[test]
    fn with_token_duration_applies_to_issued_tokens() {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "foobar")
            .unwrap()
            .with_token_duration(Duration::hours(-2));
        let token = state.token_keys.issue(UserID::new(3)).unwrap();

        let resolver = SharedResolver::from_ref(&state);

        assert!(resolver.resolve_token(&token).is_err());
    }
}
