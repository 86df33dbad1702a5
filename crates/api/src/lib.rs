//! Casawood storefront API library.
//!
//! The server binary is a thin wrapper over [`routes::app`]; keeping the
//! router in a library lets it be exercised in-process by tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
