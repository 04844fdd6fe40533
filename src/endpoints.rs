//! The API endpoints URIs.

/// The root route which returns a welcome message.
pub const ROOT: &str = "/";
/// The route for registering a new user.
pub const REGISTER: &str = "/api/v1/users/register";
/// The route for logging in and getting a bearer token.
pub const LOG_IN: &str = "/api/v1/users/login";
/// The route for adding money to the caller's account.
pub const FUND: &str = "/api/v1/accounts/fund";
/// The route for taking money out of the caller's account.
pub const WITHDRAW: &str = "/api/v1/accounts/withdraw";
/// The route for moving money to another user's account.
pub const TRANSFER: &str = "/api/v1/accounts/transfer";
/// The route for getting the caller's account and balance.
pub const ME: &str = "/api/v1/accounts/me";
/// The route for listing the caller's transactions.
pub const TRANSACTIONS: &str = "/api/v1/accounts/transactions";

#[cfg(test)]
mod tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::REGISTER);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::FUND);
        assert_endpoint_is_valid_uri(endpoints::WITHDRAW);
        assert_endpoint_is_valid_uri(endpoints::TRANSFER);
        assert_endpoint_is_valid_uri(endpoints::ME);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
    }
}
