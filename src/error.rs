//! Defines the app level error type and its conversion into JSON error responses.
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ErrorCode;
use serde_json::json;

/// The errors that may occur in the application.
///
/// The display text of the client facing variants is sent back as the
/// `error` field of the response body, so it should stay stable.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A fund, withdraw or transfer was requested with an amount of zero or less.
    #[error("Amount must be positive.")]
    InvalidAmount,

    /// The actor does not have enough money for a withdrawal or transfer.
    ///
    /// No balance is changed when this error is returned.
    #[error("Insufficient balance.")]
    InsufficientBalance,

    /// The actor tried to transfer money to their own account.
    #[error("Cannot transfer funds to yourself.")]
    SelfTransfer,

    /// Crediting the amount would overflow the account balance.
    #[error("Amount would overflow the account balance.")]
    BalanceOverflow,

    /// The authenticated identity does not belong to a stored account.
    #[error("User not found.")]
    ActorNotFound,

    /// The sender of a transfer does not have a stored account.
    #[error("Sender not found.")]
    SenderNotFound,

    /// There is no account registered with the recipient's email.
    #[error("Recipient not found.")]
    RecipientNotFound,

    /// The request to a protected route did not have an `Authorization` header.
    #[error("No authorization header provided.")]
    MissingAuthHeader,

    /// The bearer token is malformed, expired or was not signed by this server.
    #[error("Please authenticate.")]
    AuthenticationFailure,

    /// The email and password do not match a registered user.
    #[error("Invalid login credentials.")]
    InvalidCredentials,

    /// The email used to register is already in use. The client should try
    /// again with a different email address.
    #[error("Email is already registered.")]
    DuplicateEmail,

    /// The string could not be parsed as an email address.
    #[error("{0} is not a valid email address.")]
    InvalidEmail(String),

    /// The user provided a password that is too easy to guess.
    #[error("Password is too weak: {0}")]
    TooWeak(String),

    /// The request body could not be parsed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// The database stayed busy or locked for longer than the busy timeout.
    #[error("the database is unavailable: {0}")]
    StoreUnavailable(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A bearer token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// The HTTP status code that the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidAmount
            | Error::InsufficientBalance
            | Error::SelfTransfer
            | Error::BalanceOverflow
            | Error::InvalidCredentials
            | Error::DuplicateEmail
            | Error::InvalidEmail(_)
            | Error::TooWeak(_)
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::ActorNotFound
            | Error::SenderNotFound
            | Error::RecipientNotFound
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::MissingAuthHeader | Error::AuthenticationFailure => StatusCode::UNAUTHORIZED,
            Error::StoreUnavailable(_)
            | Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            // Code 275 occurs when a CHECK constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 275 && desc.contains("balance") =>
            {
                Error::InsufficientBalance
            }
            rusqlite::Error::SqliteFailure(sql_error, _)
                if matches!(
                    sql_error.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                Error::StoreUnavailable(sql_error.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Infrastructure errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "Internal server error.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use super::Error;

    async fn response_body(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_keep_their_message() {
        let (status, body) = response_body(Error::InsufficientBalance).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Insufficient balance.");
    }

    #[tokio::test]
    async fn not_found_errors_use_404() {
        let (status, body) = response_body(Error::RecipientNotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Recipient not found.");
    }

    #[tokio::test]
    async fn missing_sender_is_reported_by_name() {
        let (status, body) = response_body(Error::SenderNotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Sender not found.");
    }

    #[tokio::test]
    async fn infrastructure_errors_hide_details() {
        let (status, body) =
            response_body(Error::StoreUnavailable("database is locked".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error.");
    }

    #[test]
    fn unique_email_violation_maps_to_duplicate_email() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE user (email TEXT UNIQUE NOT NULL)", ())
            .unwrap();
        connection
            .execute("INSERT INTO user (email) VALUES ('a@b.c')", ())
            .unwrap();

        let error: Error = connection
            .execute("INSERT INTO user (email) VALUES ('a@b.c')", ())
            .unwrap_err()
            .into();

        assert_eq!(error, Error::DuplicateEmail);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }
}
