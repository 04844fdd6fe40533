//! Opens and configures SQLite connections and creates the application's tables.

use std::{path::Path, time::Duration};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, ledger::create_transaction_table};

/// How long a connection waits for another writer to release the database
/// before giving up with [Error::StoreUnavailable].
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the SQLite database at `path` and configure the connection for use by the ledger.
///
/// # Errors
/// Returns an error if the database cannot be opened or configured.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    configure(&connection)?;

    Ok(connection)
}

/// Settings are per connection, so every connection must be configured
/// before it touches the ledger.
fn configure(connection: &Connection) -> Result<(), Error> {
    connection.busy_timeout(BUSY_TIMEOUT)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    Ok(())
}

/// Configure `connection` and create the tables for the domain models if they do not exist.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    configure(connection)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
