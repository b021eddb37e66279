//! Order management CLI - Database migrations and sample data.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! om-cli migrate
//!
//! # Load the sample customers, products and orders
//! om-cli seed
//! ```
//!
//! Both commands read `ORDERS_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "om-cli")]
#[command(author, version, about = "Order management CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert sample customers, products and orders (idempotent)
    Seed,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await,
        Commands::Seed => commands::seed::run(&pool).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_subcommands() {
        assert!(matches!(
            Cli::try_parse_from(["om-cli", "migrate"]).map(|c| c.command),
            Ok(Commands::Migrate)
        ));
        assert!(matches!(
            Cli::try_parse_from(["om-cli", "seed"]).map(|c| c.command),
            Ok(Commands::Seed)
        ));
        assert!(Cli::try_parse_from(["om-cli", "drop"]).is_err());
    }
}
