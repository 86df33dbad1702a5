//! Reference data: fabrics and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use casawood_core::{CategoryId, FabricId};

use crate::error::FieldError;

/// An upholstery fabric a customer can pick for a product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Fabric {
    pub id: FabricId,
    pub name: String,
    #[serde(rename = "type")]
    pub fabric_type: String,
    pub color: String,
    pub color_hex: Option<String>,
    pub image: Option<String>,
    pub price_modifier: Decimal,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFabric {
    pub name: String,
    #[serde(rename = "type")]
    pub fabric_type: String,
    pub color: String,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price_modifier: Decimal,
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

const fn default_true() -> bool {
    true
}

impl NewFabric {
    /// # Errors
    ///
    /// Returns the list of invalid fields.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Fabric name is required"));
        }
        if self.fabric_type.trim().is_empty() {
            errors.push(FieldError::new("type", "Fabric type is required"));
        }
        if self.color.trim().is_empty() {
            errors.push(FieldError::new("color", "Colour is required"));
        }
        if let Some(hex) = &self.color_hex
            && !is_hex_color(hex)
        {
            errors.push(FieldError::new("colorHex", "Colour must look like #A1B2C3"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|h| matches!(h.len(), 3 | 6) && h.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// A browsable product category with display metadata.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#A1b2C3"));
        assert!(is_hex_color("#fff"));
        assert!(!is_hex_color("A1B2C3"));
        assert!(!is_hex_color("#12345G"));
    }

    #[test]
    fn test_new_fabric_defaults() {
        let fabric: NewFabric = serde_json::from_value(serde_json::json!({
            "name": "Mustard Velvet",
            "type": "velvet",
            "color": "Mustard",
        }))
        .unwrap();
        assert!(fabric.in_stock);
        assert_eq!(fabric.price_modifier, Decimal::ZERO);
        assert!(fabric.validate().is_ok());
    }

    #[test]
    fn test_new_fabric_bad_hex() {
        let fabric: NewFabric = serde_json::from_value(serde_json::json!({
            "name": "Slate Linen",
            "type": "linen",
            "color": "Slate",
            "colorHex": "slate",
        }))
        .unwrap();
        let errors = fabric.validate().unwrap_err();
        assert_eq!(errors[0].field, "colorHex");
    }
}
