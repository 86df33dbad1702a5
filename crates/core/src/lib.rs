//! Casawood Core - Shared domain types.
//!
//! This crate provides the types used across all Casawood components:
//! - `api` - The storefront REST API server
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Checkout arithmetic lives here so that every
//! code path that prices an order (order placement, payment-order creation,
//! payment verification) shares one tested implementation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, contact details, money and statuses
//! - [`checkout`] - Order totals and order-number generation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod types;

pub use checkout::{CheckoutTotals, DeliveryPolicy, LineAmounts, OrderNumber};
pub use types::*;
