//! Casawood CLI - database migrations, catalog seeding and admin users.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! cw-cli migrate
//!
//! # Load categories, fabrics and products from YAML
//! cw-cli seed crates/cli/seed/catalog.yaml
//!
//! # Wipe the catalog first, then load
//! cw-cli seed crates/cli/seed/catalog.yaml --clear
//!
//! # Create (or promote) an admin user
//! cw-cli admin create -e admin@casawood.in -n "Store Admin" -p 'a-long-password'
//! ```
//!
//! Every command reads `CASAWOOD_DATABASE_URL` (falling back to
//! `DATABASE_URL`), loading `.env` if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "Casawood CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Upsert catalog data from a YAML file
    Seed {
        /// Path to the seed file
        file: String,

        /// Delete existing products, fabrics and categories first
        #[arg(long)]
        clear: bool,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin user, or promote an existing account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password for email sign-in
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear } => {
            commands::seed::catalog(&file, clear).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
    }
    Ok(())
}
