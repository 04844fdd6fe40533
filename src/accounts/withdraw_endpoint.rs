use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    Error,
    accounts::{AmountRequest, BalanceResponse, LedgerState},
    auth::Actor,
    ledger::withdraw,
};

/// A route handler for taking money out of the caller's account.
pub async fn withdraw_endpoint(
    State(state): State<LedgerState>,
    Actor(actor): Actor,
    payload: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, Error> {
    let Json(request) = payload?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    withdraw(actor, request.amount, &connection).map(|receipt| Json(receipt.into()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        accounts::BalanceResponse,
        endpoints,
        ledger::TransactionKind,
        test_utils::{fund_account, get_test_app_state, get_test_server, register},
    };

    #[tokio::test]
    async fn withdraw_decreases_balance() {
        let server = get_test_server(get_test_app_state());
        let (_, token) = register(&server, "test@example.com").await;
        fund_account(&server, &token, 200).await;

        let response = server
            .post(endpoints::WITHDRAW)
            .authorization_bearer(&token)
            .json(&json!({ "amount": 75 }))
            .await;

        response.assert_status_ok();
        let body = response.json::<BalanceResponse>();
        assert_eq!(body.user.balance, 125);
        assert_eq!(body.transaction.kind, TransactionKind::Withdraw);
        assert_eq!(body.transaction.amount.as_i64(), 75);
    }

    #[tokio::test]
    async fn withdraw_fails_on_insufficient_balance() {
        let server = get_test_server(get_test_app_state());
        let (_, token) = register(&server, "test@example.com").await;
        fund_account(&server, &token, 50).await;

        let response = server
            .post(endpoints::WITHDRAW)
            .authorization_bearer(&token)
            .json(&json!({ "amount": 51 }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<serde_json::Value>()["error"],
            "Insufficient balance."
        );
    }

    #[tokio::test]
    async fn withdraw_fails_on_zero_amount() {
        let server = get_test_server(get_test_app_state());
        let (_, token) = register(&server, "test@example.com").await;

        let response = server
            .post(endpoints::WITHDRAW)
            .authorization_bearer(&token)
            .json(&json!({ "amount": 0 }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<serde_json::Value>()["error"],
            "Amount must be positive."
        );
    }
}
