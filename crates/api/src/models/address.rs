//! Saved delivery addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use casawood_core::{AddressId, AddressType, Phone, Pincode, UserId};

use crate::error::FieldError;

/// An address in a user's address book.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub full_name: String,
    pub phone: Phone,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub country: String,
    pub address_type: AddressType,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Copy of an address stored on an order, so later edits don't rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSnapshot {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

impl From<&Address> for AddressSnapshot {
    fn from(a: &Address) -> Self {
        Self {
            full_name: a.full_name.clone(),
            phone: a.phone.to_string(),
            line1: a.line1.clone(),
            line2: a.line2.clone(),
            city: a.city.clone(),
            state: a.state.clone(),
            pincode: a.pincode.to_string(),
            country: a.country.clone(),
        }
    }
}

/// Address fields as submitted by a client, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub full_name: String,
    pub phone: String,
    #[serde(alias = "addressLine1")]
    pub line1: String,
    #[serde(default, alias = "addressLine2")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub address_type: Option<AddressType>,
    #[serde(default)]
    pub is_default: bool,
}

/// A validated address ready to store.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: Phone,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub country: String,
    pub address_type: AddressType,
    pub is_default: bool,
}

impl TryFrom<AddressInput> for NewAddress {
    type Error = Vec<FieldError>;

    fn try_from(input: AddressInput) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let required = [
            ("fullName", &input.full_name, "Full name is required"),
            ("line1", &input.line1, "Address line 1 is required"),
            ("city", &input.city, "City is required"),
            ("state", &input.state, "State is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, message));
            }
        }

        let phone = Phone::parse(&input.phone)
            .map_err(|_| errors.push(FieldError::new("phone", "Please provide a valid 10-digit phone number")))
            .ok();
        let pincode = Pincode::parse(&input.pincode)
            .map_err(|_| errors.push(FieldError::new("pincode", "Please provide a valid 6-digit pincode")))
            .ok();

        match (phone, pincode) {
            (Some(phone), Some(pincode)) if errors.is_empty() => Ok(Self {
                full_name: input.full_name.trim().to_string(),
                phone,
                line1: input.line1.trim().to_string(),
                line2: input
                    .line2
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty()),
                city: input.city.trim().to_string(),
                state: input.state.trim().to_string(),
                pincode,
                country: input
                    .country
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "India".to_string()),
                address_type: input.address_type.unwrap_or_default(),
                is_default: input.is_default,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(phone: &str, pincode: &str) -> AddressInput {
        serde_json::from_value(serde_json::json!({
            "fullName": "Kabir Menon",
            "phone": phone,
            "line1": "14 Residency Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": pincode,
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_address_normalises_phone_and_defaults_country() {
        let address = NewAddress::try_from(input("+91 98450 12345", "560025")).unwrap();
        assert_eq!(address.phone.as_str(), "9845012345");
        assert_eq!(address.country, "India");
        assert_eq!(address.address_type, AddressType::Home);
        assert!(!address.is_default);
    }

    #[test]
    fn test_invalid_phone_and_pincode_reported_together() {
        let errors = NewAddress::try_from(input("12345", "056002")).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["phone", "pincode"]);
    }

    #[test]
    fn test_blank_required_fields() {
        let mut raw = input("9845012345", "560025");
        raw.city = "  ".to_string();
        let errors = NewAddress::try_from(raw).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().field, "city");
    }

    #[test]
    fn test_snapshot_copies_fields() {
        let now = Utc::now();
        let validated = NewAddress::try_from(input("9845012345", "560025")).unwrap();
        let address = Address {
            id: AddressId::new(1),
            user_id: UserId::new(1),
            full_name: validated.full_name,
            phone: validated.phone,
            line1: validated.line1,
            line2: None,
            city: validated.city,
            state: validated.state,
            pincode: validated.pincode,
            country: validated.country,
            address_type: validated.address_type,
            is_default: true,
            created_at: now,
            updated_at: now,
        };
        let snapshot = AddressSnapshot::from(&address);
        assert_eq!(snapshot.pincode, "560025");
        assert_eq!(snapshot.full_name, "Kabir Menon");
    }
}
