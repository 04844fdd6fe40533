//! The extractor that authenticates requests to protected routes.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    Error,
    auth::{SharedResolver, UserID},
};

/// The authenticated user making a request.
///
/// Extracting an `Actor` rejects the request with a 401 when the
/// `Authorization: Bearer <token>` header is missing or the token is invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor(pub UserID);

impl<S> FromRequestParts<S> for Actor
where
    SharedResolver: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    Error::MissingAuthHeader
                } else {
                    Error::AuthenticationFailure
                }
            })?;

        let resolver = SharedResolver::from_ref(state);
        let user_id = resolver.resolve_token(bearer.token())?;

        Ok(Actor(user_id))
    }
}
