//! Token issuer - Signs and verifies bearer tokens.
//!
//! SOLID (SRP): Token construction and verification only.
//! SOLID (DIP): Receives its signing material as `TokenSettings`, never reads
//! configuration itself.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{TokenSettings, TOKEN_LIFETIME_MINUTES};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Email the token was issued to
    pub sub: String,
    /// Role display name (`admin` or `user`)
    pub role: String,
    pub email: String,
    /// Unique token identifier
    pub jti: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Check if the token grants admin privileges
    pub fn is_admin(&self) -> bool {
        self.role == crate::config::ROLE_ADMIN
    }
}

/// Token issuer trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `subject` carrying `role` as its role claim
    fn issue(&self, subject: &str, role: &str) -> AppResult<String>;

    /// Check signature, lifetime and issuer, returning the claims
    fn verify(&self, token: &str) -> AppResult<Claims>;
}

/// HS256 implementation keyed by the UTF-8 bytes of a shared secret.
pub struct JwtIssuer {
    settings: TokenSettings,
}

impl JwtIssuer {
    /// Create a new issuer. The secret is checked on every issuance.
    pub fn new(settings: TokenSettings) -> Self {
        Self { settings }
    }

    fn secret(&self) -> AppResult<&[u8]> {
        if self.settings.secret.is_empty() {
            return Err(AppError::configuration("token signing secret is not set"));
        }
        Ok(self.settings.secret.as_bytes())
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.validate_aud = false;
        validation
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, subject: &str, role: &str) -> AppResult<String> {
        let key = EncodingKey::from_secret(self.secret()?);
        let now = Utc::now();
        let expires_at = now + Duration::minutes(TOKEN_LIFETIME_MINUTES);

        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            email: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.settings.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
    }

    fn verify(&self, token: &str) -> AppResult<Claims> {
        let key = DecodingKey::from_secret(self.secret()?);
        let token_data = decode::<Claims>(token, &key, &self.validation())?;

        Ok(token_data.claims)
    }
}
