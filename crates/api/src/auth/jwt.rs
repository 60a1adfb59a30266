//! Session tokens.
//!
//! A login yields an [`IssuedTokens`] pair: a short-lived HS256 access JWT
//! carrying [`Claims`], and an opaque refresh token of which the server only
//! persists the SHA-256 digest.

use chrono::Duration;
use folio_core::actor::Actor;
use folio_core::roles::is_staff_role;
use folio_core::types::{DbId, Timestamp};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::env_or;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `JWT_SECRET`              | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | no       | `60`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 60),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expiry_mins)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_expiry_days)
    }
}

/// Access-token payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// `"admin"`, `"staff"` or `"user"`, fixed at issue time.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// The caller these claims authenticate.
    pub fn actor(&self) -> Actor {
        Actor::User {
            id: self.sub,
            is_staff: is_staff_role(&self.role),
        }
    }
}

/// Everything produced by a successful login or refresh.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Plaintext handed to the client once.
    pub refresh_token: String,
    /// Digest stored in the session row.
    pub refresh_token_hash: String,
    pub refresh_expires_at: Timestamp,
}

/// Sign an access token and mint a refresh token for `user_id`.
pub fn issue_tokens(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
    now: Timestamp,
) -> Result<IssuedTokens, jsonwebtoken::errors::Error> {
    let ttl = config.access_ttl();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    let refresh_token = Uuid::new_v4().simple().to_string();
    Ok(IssuedTokens {
        access_token,
        expires_in: ttl.num_seconds(),
        refresh_token_hash: hash_refresh_token(&refresh_token),
        refresh_token,
        refresh_expires_at: now + config.refresh_ttl(),
    })
}

/// Verify signature and expiry; returns the embedded claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Hex SHA-256 of a refresh token, as stored in `sessions.refresh_token_hash`.
pub fn hash_refresh_token(token: &str) -> String {
    let digest = Sha256::digest(token.trim().as_bytes());
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "folio-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn issued_access_token_round_trips_to_an_actor() {
        let now = Utc::now();
        let tokens = issue_tokens(7, "staff", &config(), now).unwrap();
        assert_eq!(tokens.expires_in, 3600);
        assert_eq!(tokens.refresh_expires_at, now + Duration::days(7));

        let claims = validate_token(&tokens.access_token, &config()).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.actor(), Actor::User { id: 7, is_staff: true });
    }

    #[test]
    fn plain_user_is_not_staff() {
        let tokens = issue_tokens(3, "user", &config(), Utc::now()).unwrap();
        let claims = validate_token(&tokens.access_token, &config()).unwrap();
        assert_eq!(claims.actor(), Actor::User { id: 3, is_staff: false });
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the default 60-second leeway.
        let issued_at = Utc::now() - Duration::hours(2);
        let tokens = issue_tokens(1, "user", &config(), issued_at).unwrap();
        assert!(validate_token(&tokens.access_token, &config()).is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = JwtConfig {
            secret: "a-different-secret".to_string(),
            ..config()
        };
        let tokens = issue_tokens(1, "user", &other, Utc::now()).unwrap();
        assert!(validate_token(&tokens.access_token, &config()).is_err());
    }

    #[test]
    fn refresh_token_is_stored_as_digest() {
        let tokens = issue_tokens(1, "user", &config(), Utc::now()).unwrap();
        assert_eq!(hash_refresh_token(&tokens.refresh_token), tokens.refresh_token_hash);
        assert_eq!(tokens.refresh_token_hash.len(), 64);
        assert_ne!(tokens.refresh_token, tokens.refresh_token_hash);
    }
}
