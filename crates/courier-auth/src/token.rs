use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use courier_types::error::{Error, Result};
use courier_types::models::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated user.
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies signed session tokens. The signing secret is
/// process-wide configuration injected at construction; verification is
/// stateless and does not consult the store.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Sign a token binding the given username, with an issued-at claim.
    pub fn issue(&self, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::days(30)).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(Error::store)
    }

    /// Decode and verify a token into a request principal. Whether the
    /// claimed user still exists is the store's concern, not this one's.
    pub fn verify(&self, token: &str) -> Result<Principal> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(|_| Error::InvalidToken)?;
        if data.claims.sub.is_empty() {
            return Err(Error::InvalidToken);
        }
        Ok(Principal {
            username: data.claims.sub,
        })
    }
}
