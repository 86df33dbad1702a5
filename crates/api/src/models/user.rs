//! User domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use casawood_core::{Email, LoyaltyTier, UserId, UserRole};

/// A storefront account.
///
/// Users are never hard-deleted; orders keep referring to them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    /// `None` for accounts that only sign in with Google.
    #[serde(skip)]
    pub password_hash: Option<String>,
    #[serde(skip)]
    pub google_id: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub loyalty_tier: LoyaltyTier,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_hides_credentials() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(3),
            name: "Meera Iyer".to_string(),
            email: Email::parse("meera@example.in").unwrap(),
            password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string()),
            google_id: Some("1101694844".to_string()),
            phone: None,
            avatar: None,
            role: UserRole::User,
            loyalty_tier: LoyaltyTier::Silver,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("googleId").is_none());
        assert_eq!(json["loyaltyTier"], "silver");
        assert_eq!(json["email"], "meera@example.in");
        assert!(!user.is_admin());
    }
}
