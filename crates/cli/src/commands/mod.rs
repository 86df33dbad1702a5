//! Command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Name of the variable every command reads the connection string from.
pub const DATABASE_URL_VAR: &str = "CASAWOOD_DATABASE_URL";

/// Database URL from the environment, after loading `.env`.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
