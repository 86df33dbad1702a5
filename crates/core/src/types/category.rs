//! Product category enum.

use serde::{Deserialize, Serialize};

/// Error returned for an unknown category slug.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product category: {0}")]
pub struct CategoryError(pub String);

/// The fixed set of furniture categories a product can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Sofas,
    Beds,
    Dining,
    Chairs,
    Tables,
    Storage,
    Decor,
    Outdoor,
    Office,
}

impl ProductCategory {
    pub const ALL: [Self; 9] = [
        Self::Sofas,
        Self::Beds,
        Self::Dining,
        Self::Chairs,
        Self::Tables,
        Self::Storage,
        Self::Decor,
        Self::Outdoor,
        Self::Office,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sofas => "sofas",
            Self::Beds => "beds",
            Self::Dining => "dining",
            Self::Chairs => "chairs",
            Self::Tables => "tables",
            Self::Storage => "storage",
            Self::Decor => "decor",
            Self::Outdoor => "outdoor",
            Self::Office => "office",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Sofas".parse::<ProductCategory>().unwrap(), ProductCategory::Sofas);
        assert_eq!(" dining ".parse::<ProductCategory>().unwrap(), ProductCategory::Dining);
    }

    #[test]
    fn test_unknown_category() {
        assert!("lamps".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn test_every_category_round_trips() {
        for category in ProductCategory::ALL {
            assert_eq!(category.to_string().parse::<ProductCategory>().unwrap(), category);
        }
    }
}
