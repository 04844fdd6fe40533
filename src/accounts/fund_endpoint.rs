use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    Error,
    accounts::{AmountRequest, BalanceResponse, LedgerState},
    auth::Actor,
    ledger::fund,
};

/// A route handler for adding money to the caller's account.
pub async fn fund_endpoint(
    State(state): State<LedgerState>,
    Actor(actor): Actor,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, Error> {
    let Json(request) = payload?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    fund(actor, request.amount, &connection).map(|receipt| Json(receipt.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        accounts::BalanceResponse,
        endpoints,
        ledger::TransactionKind,
        test_utils::{get_test_app_state, get_test_server, register},
    };

    #[tokio::test]
    async fn fund_increases_balance() {
        let server = get_test_server(get_test_app_state());
        let (account, token) = register(&server, "test@example.com").await;

        let response = server
            .post(endpoints::FUND)
            .authorization_bearer(&token)
            .json(&json!({ "amount": 200 }))
            .await;

        response.assert_status_ok();
        let body = response.json::<BalanceResponse>();
        assert_eq!(body.user.id, account.id);
        assert_eq!(body.user.balance, 200);
        assert_eq!(body.transaction.kind, TransactionKind::Fund);
        assert_eq!(body.transaction.amount.as_i64(), 200);
        assert_eq!(body.transaction.sender, account.id);
    }

    #[tokio::test]
    async fn fund_fails_on_negative_amount() {
        let server = get_test_server(get_test_app_state());
        let (_, token) = register(&server, "test@example.com").await;

        let response = server
            .post(endpoints::FUND)
            .authorization_bearer(&token)
            .json(&json!({ "amount": -5 }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<serde_json::Value>()["error"],
            "Amount must be positive."
        );
    }

    #[tokio::test]
    async fn fund_fails_on_fractional_amount() {
        let server = get_test_server(get_test_app_state());
        let (_, token) = register(&server, "test@example.com").await;

        let response = server
            .post(endpoints::FUND)
            .authorization_bearer(&token)
            .json(&json!({ "amount": 1.5 }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn fund_requires_token() {
        let server = get_test_server(get_test_app_state());

        let response = server
            .post(endpoints::FUND)
            .json(&json!({ "amount": 100 }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<serde_json::Value>()["error"],
            "No authorization header provided."
        );
    }

    #[tokio::test]
    async fn fund_rejects_invalid_token() {
        let server = get_test_server(get_test_app_state());

        let response = server
            .post(endpoints::FUND)
            .authorization_bearer("not-a-token")
            .json(&json!({ "amount": 100 }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<serde_json::Value>()["error"],
            "Please authenticate."
        );
    }

    #[tokio::test]
    async fn fund_fails_when_user_no_longer_exists() {
        let state = get_test_app_state();
        let token = state
            .token_keys
            .issue(crate::auth::UserID::new(999))
            .unwrap();
        let server = get_test_server(state);

        let response = server
            .post(endpoints::FUND)
            .authorization_bearer(&token)
            .json(&json!({ "amount": 100 }))
            .await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<serde_json::Value>()["error"],
            "User not found."
        );
    }
}
