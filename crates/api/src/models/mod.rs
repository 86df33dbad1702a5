//! Domain models.
//!
//! Row types derive `sqlx::FromRow` and serialize in camelCase, so the same
//! struct is read from `PostgreSQL` and returned to API clients.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, AddressInput, AddressSnapshot, NewAddress};
pub use cart::{CartItem, CartOwner, CartView};
pub use catalog::{Category, Fabric, NewCategory, NewFabric};
pub use order::{GatewayPayment, NewOrder, Order, OrderItem};
pub use product::{NewProduct, Product, ProductUpdate, slugify};
pub use user::User;
