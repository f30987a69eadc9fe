use steppe_core::AppConfig;
use steppe_db::{AnyMenuStore, MenuStore};

use crate::DbCommands;

pub(crate) async fn run_db_command(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Migrate => {
            let pool = steppe_db::connect_pool_from_config(config).await?;
            let applied = steppe_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            let store = AnyMenuStore::from_config(config).await?;
            store.ping().await?;
            println!("{} store reachable", store.backend());
        }
    }
    Ok(())
}
