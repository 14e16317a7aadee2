//! JWT generation and validation for user and admin tokens.
//!
//! User tokens carry the user id and stored role. Admin tokens carry a
//! SHA-256 fingerprint of the configured admin credentials instead of the
//! credentials themselves; rotating either value invalidates every issued
//! admin token.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pmdesk_core::roles::Role;
use pmdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Claims embedded in every user (`token` / `mtoken`) token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Stored role name at issue time (`"Manager"`, `"User"`, ...).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Claims embedded in an admin (`atoken`) token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    /// Always [`ADMIN_SUBJECT`].
    pub sub: String,
    /// Hex SHA-256 of the admin email and password, concatenated.
    pub fingerprint: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Subject used for admin tokens.
pub const ADMIN_SUBJECT: &str = "admin";

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in hours (default: 24).
    pub expiry_hours: i64,
}

/// Default token expiry in hours.
const DEFAULT_EXPIRY_HOURS: i64 = 24;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `JWT_EXPIRY_HOURS` | no       | `24`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let expiry_hours: i64 = std::env::var("JWT_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_HOURS.to_string())
            .parse()
            .expect("JWT_EXPIRY_HOURS must be a valid i64");

        Self {
            secret,
            expiry_hours,
        }
    }
}

/// Generate an HS256 token for a user record.
pub fn generate_user_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp: now + config.expiry_hours * 3600,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a user token. Checks signature and expiry.
pub fn validate_user_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Generate an HS256 admin token bound to the given credential fingerprint.
pub fn generate_admin_token(
    fingerprint: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = AdminClaims {
        sub: ADMIN_SUBJECT.to_string(),
        fingerprint: fingerprint.to_string(),
        exp: now + config.expiry_hours * 3600,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an admin token. The caller compares the fingerprint.
pub fn validate_admin_token(
    token: &str,
    config: &JwtConfig,
) -> Result<AdminClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.sub = Some(ADMIN_SUBJECT.to_string());
    let token_data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Hex SHA-256 of `email` followed by `password`.
pub fn credential_fingerprint(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 24,
        }
    }

    #[test]
    fn test_generate_and_validate_user_token() {
        let config = test_config();
        let token = generate_user_token(42, Role::Manager, &config)
            .expect("token generation should succeed");

        let claims = validate_user_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "Manager");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_expired_token_fails() {
        let config = test_config();

        // Expired well past the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "User".to_string(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed");

        assert!(validate_user_token(&token, &config).is_err());
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = JwtConfig {
            secret: "secret-alpha".to_string(),
            expiry_hours: 24,
        };
        let config_b = JwtConfig {
            secret: "secret-bravo".to_string(),
            expiry_hours: 24,
        };

        let token = generate_user_token(1, Role::User, &config_a)
            .expect("token generation should succeed");
        assert!(validate_user_token(&token, &config_b).is_err());
    }

    #[test]
    fn test_admin_token_round_trip() {
        let config = test_config();
        let fingerprint = credential_fingerprint("admin@example.com", "admin-pass");
        let token = generate_admin_token(&fingerprint, &config).expect("admin token");

        let claims = validate_admin_token(&token, &config).expect("admin token should validate");
        assert_eq!(claims.sub, ADMIN_SUBJECT);
        assert_eq!(claims.fingerprint, fingerprint);
    }

    #[test]
    fn test_user_and_admin_tokens_are_not_interchangeable() {
        let config = test_config();
        let user_token = generate_user_token(7, Role::User, &config).expect("user token");
        assert!(validate_admin_token(&user_token, &config).is_err());

        let admin_token =
            generate_admin_token(&credential_fingerprint("a@b.c", "pw"), &config).expect("token");
        assert!(validate_user_token(&admin_token, &config).is_err());
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = credential_fingerprint("admin@example.com", "secret");
        let b = credential_fingerprint("admin@example.com", "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, credential_fingerprint("admin@example.com", "other"));
    }
}
