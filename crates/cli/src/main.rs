//! Longing for heaven CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply every pending migration
//! lh-cli migrate up
//!
//! # Revert the latest migration, or everything newer than a version
//! lh-cli migrate down
//! lh-cli migrate down --target 20250720000000
//!
//! # Show known migrations and whether they are applied
//! lh-cli migrate status
//!
//! # Create the admin account from ADMIN_EMAIL / ADMIN_PASSWORD
//! lh-cli admin bootstrap
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lh-cli")]
#[command(author, version, about = "Longing for heaven CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Manage the admin account
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert migrations
    Down {
        /// Keep this version and everything older (default: revert only the latest)
        #[arg(short, long)]
        target: Option<i64>,
    },
    /// List migrations and their applied state
    Status,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Ensure an admin account exists
    Bootstrap,
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
        Commands::Migrate { action } => match action {
            MigrateAction::Up => commands::migrate::up().await?,
            MigrateAction::Down { target } => commands::migrate::down(target).await?,
            MigrateAction::Status => commands::migrate::status().await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Bootstrap => commands::admin::bootstrap().await?,
        },
    }
    Ok(())
}
