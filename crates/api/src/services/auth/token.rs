//! Bearer token issuing and verification (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use casawood_core::{UserId, UserRole};

use super::AuthError;
use crate::config::JwtConfig;

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// The user this token was issued to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if `sub` is not a user id.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Issue a token for `user_id` valid for the configured number of days.
///
/// # Errors
///
/// Returns `AuthError::TokenEncoding` if signing fails.
pub fn issue(user_id: UserId, role: UserRole, config: &JwtConfig) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::days(config.expiry_days)).timestamp(),
    };
    encode_claims(&claims, config)
}

fn encode_claims(claims: &Claims, config: &JwtConfig) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(config.secret.expose_secret().as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign token");
        AuthError::TokenEncoding
    })
}

/// Decode and validate a token.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` past `exp`, `AuthError::InvalidToken`
/// for any other failure.
pub fn verify(token: &str, config: &JwtConfig) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: SecretString::from(secret),
            expiry_days: 7,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let cfg = config("k7Fq2mZp9Xv4Lr8Nw3Bt6Hy1Jd5Gs0Ce");
        let token = issue(UserId::new(42), UserRole::Admin, &cfg).unwrap();
        let claims = verify(&token, &cfg).unwrap();

        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_signed_with_other_key_rejected() {
        let token = issue(UserId::new(1), UserRole::User, &config("k7Fq2mZp9Xv4Lr8Nw3Bt6Hy1Jd5Gs0Ce")).unwrap();
        let result = verify(&token, &config("Zz9Yy8Xx7Ww6Vv5Uu4Tt3Ss2Rr1Qq0Pp"));
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let cfg = config("k7Fq2mZp9Xv4Lr8Nw3Bt6Hy1Jd5Gs0Ce");
        let issued = Utc::now() - Duration::days(8);
        let claims = Claims {
            sub: "5".to_string(),
            role: UserRole::User,
            iat: issued.timestamp(),
            exp: (issued + Duration::days(1)).timestamp(),
        };
        let token = encode_claims(&claims, &cfg).unwrap();

        assert!(matches!(verify(&token, &cfg), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let cfg = config("k7Fq2mZp9Xv4Lr8Nw3Bt6Hy1Jd5Gs0Ce");
        assert!(matches!(verify("not.a.jwt", &cfg), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let claims = Claims {
            sub: "64f1c2a9e4b0".to_string(),
            role: UserRole::User,
            iat: 0,
            exp: 0,
        };
        assert!(matches!(claims.user_id(), Err(AuthError::InvalidToken)));
    }
}
