use vitrine_db::migrations::MIGRATOR;

use crate::commands::{execute, open_store, CommandResult};

pub fn run() -> CommandResult {
    execute("migrate", |config| async move {
        let pool = open_store(&config).await?;
        pool.close().await;
        Ok(format!("applied pending migrations ({} known)", MIGRATOR.iter().count()))
    })
}
