//! Issuing and verifying the bearer tokens that identify a logged in user.

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// How long a token stays valid after it is issued.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: u64,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: u64,
}

/// Maps a bearer token to the user it was issued to.
pub trait IdentityResolver {
    /// Verify `token` and return the ID of the user it identifies.
    ///
    /// # Errors
    ///
    /// Returns [Error::AuthenticationFailure] if the token is malformed, expired or has an
    /// invalid signature.
    fn resolve_token(&self, token: &str) -> Result<UserID, Error>;
}

/// The identity resolver shared by the request handlers.
pub type SharedResolver = Arc<dyn IdentityResolver + Send + Sync>;

/// The keys for signing and verifying HS256 tokens, and how long issued tokens last.
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl TokenKeys {
    /// Create the keys from the server secret with the default token duration.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_duration: DEFAULT_TOKEN_DURATION,
        }
    }

    /// Set how long tokens issued from now on stay valid.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_duration = token_duration;
        self
    }

    /// Sign a token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue(&self, user_id: UserID) -> Result<String, Error> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: unix_seconds(now),
            exp: unix_seconds(now + self.token_duration),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }
}

fn unix_seconds(date_time: OffsetDateTime) -> u64 {
    u64::try_from(date_time.unix_timestamp()).unwrap_or(0)
}

impl IdentityResolver for TokenKeys {
    fn resolve_token(&self, token: &str) -> Result<UserID, Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|error| {
                tracing::debug!("Rejected bearer token: {error}");
                Error::AuthenticationFailure
            })?;

        token_data
            .claims
            .sub
            .parse()
            .map(UserID::new)
            .map_err(|_| Error::AuthenticationFailure)
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("token_duration", &self.token_duration)
            .finish_non_exhaustive()
    }
}
