use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, accounts::BalanceResponse, auth::AuthResponse, build_router, endpoints,
    ledger::Account,
};

/// A password that passes the strength check.
pub(crate) const TEST_PASSWORD: &str = "roostersgocockledoodledoo";

/// An app state over a fresh in-memory database with the cheapest bcrypt cost.
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");

    AppState::new(connection, "foobar")
        .expect("Could not create app state")
        .with_password_cost(4)
}

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state))
}

/// Register a user with [TEST_PASSWORD] and return their account and token.
pub(crate) async fn register(server: &TestServer, email: &str) -> (Account, String) {
    let response = server
        .post(endpoints::REGISTER)
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body = response.json::<AuthResponse>();

    (body.user, body.token)
}

pub(crate) async fn fund_account(server: &TestServer, token: &str, amount: i64) -> Account {
    let response = server
        .post(endpoints::FUND)
        .authorization_bearer(token)
        .json(&json!({ "amount": amount }))
        .await;
    response.assert_status_ok();

    response.json::<BalanceResponse>().user
}

pub(crate) async fn get_balance(server: &TestServer, token: &str) -> i64 {
    let response = server.get(endpoints::ME).authorization_bearer(token).await;
    response.assert_status_ok();

    response.json::<serde_json::Value>()["user"]["balance"]
        .as_i64()
        .expect("balance should be an integer")
}
