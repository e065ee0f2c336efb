//! Paperback CLI - schema creation and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the Postgres document table
//! paperback-cli migrate
//!
//! # Seed the configured store from a JSON fixture
//! paperback-cli seed --file data/api.json
//!
//! # Create an admin account
//! paperback-cli admin create -e admin@example.com -p <password> -n "Admin Name"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "paperback-cli")]
#[command(author, version, about = "Paperback CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the Postgres document table
    Migrate,
    /// Load collections from a JSON fixture into the configured store
    Seed {
        /// Fixture file, shaped like {"books": [...], "users": [...]}
        #[arg(short, long)]
        file: String,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long)]
        password: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,
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
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                name,
            } => {
                commands::admin::create_account(&email, &password, &name).await?;
            }
        },
    }
    Ok(())
}
