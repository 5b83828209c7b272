//! Shoptrail CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shoptrail-cli migrate
//!
//! # Create a user account
//! shoptrail-cli user create -e shopper@example.com -p 'correct horse'
//!
//! # Insert demo visits
//! shoptrail-cli seed visits -n 25
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create user accounts
//! - `seed visits` - Seed database with demo visits

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shoptrail-cli")]
#[command(author, version, about = "Shoptrail CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed database with demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// Plaintext password (stored as an Argon2id hash)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert random visits across a few demo shops
    Visits {
        /// Number of visits to create
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, password } => {
                commands::user::create(&email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Visits { count } => {
                commands::seed::visits(count).await?;
            }
        },
    }
    Ok(())
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
    fn test_parse_seed_count() {
        let cli = Cli::try_parse_from(["shoptrail-cli", "seed", "visits", "-n", "3"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed {
                target: SeedTarget::Visits { count: 3 }
            })
        ));
    }

    #[test]
    fn test_user_create_requires_password() {
        assert!(Cli::try_parse_from(["shoptrail-cli", "user", "create", "-e", "a@b.c"]).is_err());
    }
}
