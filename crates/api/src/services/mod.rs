//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password accounts, Google account linking, bearer tokens
//! - `google` - Google ID token verification
//! - `payment` - Razorpay order creation and signature verification
//! - `checkout` - Order placement from the caller's cart
//! - `catalog` - Cached category and fabric listings

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod google;
pub mod payment;
