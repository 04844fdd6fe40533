//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    accounts::{
        fund_endpoint, get_me_endpoint, get_transactions_endpoint, transfer_endpoint,
        withdraw_endpoint,
    },
    auth::{log_in, register_user},
    endpoints,
};

/// Return a router with all the app's routes.
///
/// The account routes are protected by the [crate::Actor] extractor in each
/// handler, which rejects requests without a valid bearer token.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_welcome))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(log_in));

    let protected_routes = Router::new()
        .route(endpoints::FUND, post(fund_endpoint))
        .route(endpoints::WITHDRAW, post(withdraw_endpoint))
        .route(endpoints::TRANSFER, post(transfer_endpoint))
        .route(endpoints::ME, get(get_me_endpoint))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_welcome() -> &'static str {
    "Welcome to the Banking API!"
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
