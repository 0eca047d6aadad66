// ============================
// goaltrack-backend-lib/src/auth/token.rs
// ============================
//! Signed, time-bounded identity tokens (JWT, HS256).
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default token lifetime: 1 day
pub const DEFAULT_TTL_SECS: u64 = 86_400;

/// Why token verification failed
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    /// Well-signed, but the claims are not the expected shape
    /// (e.g. no subject)
    #[error("invalid token payload")]
    Payload,
}

/// Claims embedded in every issued token
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    /// Identity id (stringified UUID)
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Absolute expiry (Unix timestamp)
    pub exp: i64,
}

/// Issues and verifies identity tokens against a process-wide secret.
///
/// There is no revocation: an issued token stays valid until its
/// embedded expiry, regardless of later account changes. The
/// authorization gate re-resolves the identity per request instead.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a signed token asserting `{ identity_id, email }` with
    /// expiry `now + ttl`.
    pub fn issue(&self, identity_id: Uuid, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs as i64)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Invalid)
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0; // no clock-skew tolerance

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                // signature checked out but the claims did not
                // deserialize into [`Claims`]
                jsonwebtoken::errors::ErrorKind::Json(_) => TokenError::Payload,
                _ => TokenError::Invalid,
            })
    }
}
