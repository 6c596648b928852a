//! HS256 token verification.

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of issued tokens (6 hours).
pub const TOKEN_LIFETIME_SECS: i64 = 6 * 60 * 60;

/// Token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider user ID.
    pub uid: String,
    /// Admin email, when the provider shared it.
    #[serde(default)]
    pub email: Option<String>,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Verifies and issues admin bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .context("invalid token")?;

        Ok(data.claims)
    }

    /// Issue a token for `uid`, valid for [`TOKEN_LIFETIME_SECS`].
    pub fn issue(&self, uid: &str, email: Option<&str>) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        self.encode(&Claims {
            uid: uid.to_string(),
            email: email.map(str::to_string),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        })
    }

    fn encode(&self, claims: &Claims) -> Result<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .context("failed to encode token")
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}
