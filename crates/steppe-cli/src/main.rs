mod catalog;
mod db;
mod sync;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "steppe")]
#[command(about = "Sync the iiko external menu into the menu_items table")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the configured external menu and replace every menu_items row
    Sync {
        /// Fetch and normalize only; print a preview and leave the store alone
        #[arg(long)]
        dry_run: bool,
        /// External menu name to sync instead of IIKO_MENU_NAME
        #[arg(long)]
        menu: Option<String>,
    },
    /// List the organizations visible to the API key
    Orgs,
    /// List the external menus of the configured organization
    Menus,
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check connectivity to the configured store
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = steppe_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Sync { dry_run, menu }) => {
            sync::run_sync_command(&config, dry_run, menu.as_deref()).await?;
        }
        Some(Commands::Orgs) => catalog::run_orgs(&config).await?,
        Some(Commands::Menus) => catalog::run_menus(&config).await?,
        Some(Commands::Db { command }) => db::run_db_command(&config, command).await?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}
