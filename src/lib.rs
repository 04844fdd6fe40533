//! Ledger is a small banking API.
//!
//! Users register with an email and password, log in to receive a bearer token
//! and then fund, withdraw or transfer money between accounts. Every balance
//! change is recorded in an append-only transaction log.
//!
//! This library provides a JSON REST API built on [axum] and a SQLite store.

#![warn(missing_docs)]

use std::{
    env::{self, VarError},
    net::SocketAddr,
    time::Duration,
};

use axum_server::Handle;
use tokio::signal;

mod accounts;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod error;
mod ledger;
mod logging;
mod routing;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Actor, IdentityResolver, PasswordHash, SharedResolver, TokenKeys, User, UserID,
    ValidatedPassword, count_users, create_user,
};
pub use db::{initialize as initialize_db, open_database};
pub use error::Error;
pub use ledger::{
    Account, Amount, Receipt, Transaction, TransactionID, TransactionKind, TransactionStatus,
    TransferReceipt, fund, get_account, history, transfer, withdraw,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// Get a port number from the environment variable `env_key` if set, otherwise return `default_port`.
///
/// # Panics
/// This function may panic if the environment variable `env_key` is not valid unicode.
///
/// This function may panic if the environment variable `env_key` cannot be parsed as an integer.
///
/// # Examples
///
/// ```
/// use ledger_rs::parse_port_or_default;
///
/// assert_eq!(parse_port_or_default("LEDGER_DOCTEST_PORT", 1234), 1234);
///
/// unsafe { std::env::set_var("LEDGER_DOCTEST_PORT", "4321"); }
/// assert_eq!(parse_port_or_default("LEDGER_DOCTEST_PORT", 1234), 4321);
/// # unsafe { std::env::remove_var("LEDGER_DOCTEST_PORT"); }
/// ```
pub fn parse_port_or_default(env_key: &str, default_port: u16) -> u16 {
    let port_string = match env::var(env_key) {
        Ok(string) => string,
        Err(VarError::NotPresent) => {
            tracing::debug!(
                "The environment variable '{}' was not set, using the default port {}.",
                env_key,
                default_port
            );
            return default_port;
        }
        Err(e) => {
            tracing::error!(
                "An error occurred retrieving the environment variable '{}': {}",
                env_key,
                e
            );
            panic!("could not read the environment variable '{env_key}'");
        }
    };

    match port_string.parse() {
        Ok(port_number) => port_number,
        Err(e) => {
            tracing::error!(
                "An error occurred parsing the port number '{}' from the environment variable '{}': {}",
                port_string,
                env_key,
                e
            );
            panic!("'{port_string}' is not a valid port number");
        }
    }
}

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install the Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
