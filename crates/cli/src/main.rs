//! Tech Store CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront migrations (sessions)
//! ts-cli migrate storefront
//!
//! # Run admin migrations (products, admin sessions)
//! ts-cli migrate admin
//!
//! # Run all migrations
//! ts-cli migrate all
//!
//! # Load products from a YAML file
//! ts-cli seed crates/cli/seeds/products.yaml
//!
//! # Only validate the file
//! ts-cli seed crates/cli/seeds/products.yaml --dry-run
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(author, version, about = "Tech Store CLI tools")]
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
    /// Insert products from a YAML file
    Seed {
        /// Path to the YAML file
        file: String,

        /// Validate the file without touching the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront migrations
    Storefront,
    /// Run admin migrations
    Admin,
    /// Run all migrations
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::admin().await?;
                commands::migrate::storefront().await?;
            }
        },
        Commands::Seed { file, dry_run } => {
            commands::seed::products(&file, dry_run).await?;
        }
    }
    Ok(())
}
