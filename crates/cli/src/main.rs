//! Liahna CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the products and product_images tables
//! liahna-cli migrate catalog
//!
//! # Create the storefront session table
//! liahna-cli migrate sessions
//!
//! # Run all database migrations
//! liahna-cli migrate all
//!
//! # Load the first five bundled products into an empty catalog
//! liahna-cli seed
//!
//! # Load every bundled product
//! liahna-cli seed --all
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "liahna-cli")]
#[command(author, version, about = "Liahna CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Seed an empty catalog with the bundled products
    Seed {
        /// Insert every bundled product instead of the first few
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the catalog tables (products, product images)
    Catalog,
    /// Create the storefront session table
    Sessions,
    /// Run all database migrations
    All,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Catalog => commands::migrate::catalog().await?,
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
            MigrateTarget::All => {
                commands::migrate::catalog().await?;
                commands::migrate::sessions().await?;
            }
        },
        Commands::Seed { all } => commands::seed::catalog(all).await?,
    }
    Ok(())
}
