//! Core types for Casawood.
//!
//! This module provides type-safe wrappers for common domain concepts.

/// Implements `sqlx` text encoding for a validated string newtype.
///
/// Values read back from the database are trusted and not re-validated.
macro_rules! text_newtype_sqlx {
    ($name:ident) => {
        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let s = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(s))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::core::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

pub mod category;
pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod pincode;
pub mod status;

pub use category::{CategoryError, ProductCategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{CURRENCY_CODE, to_paise};
pub use phone::{Phone, PhoneError};
pub use pincode::{Pincode, PincodeError};
pub use status::*;
