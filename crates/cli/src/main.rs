//! Combo offers CLI - Database migrations and catalog maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! combo-cli migrate
//!
//! # Mirror Shopify products into the local catalog
//! combo-cli sync
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `sync` - Run the product sync once, outside the HTTP server

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "combo-cli")]
#[command(author, version, about = "Combo offers CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Mirror Shopify products into the local catalog
    Sync,
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
        Commands::Sync => commands::sync::run().await?,
    }
    Ok(())
}
