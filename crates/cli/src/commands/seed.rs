use vitrine_db::{repositories::SqlProductRepository, seed_demo_catalog, SeedResult};

use crate::commands::{execute, open_store, CommandResult, Failure, EXIT_EXECUTION};

pub fn run() -> CommandResult {
    execute("seed", |config| async move {
        let pool = open_store(&config).await?;
        let repository = SqlProductRepository::new(pool.clone());

        let result = seed_demo_catalog(&repository).await;
        pool.close().await;

        result
            .map(|seeded| describe(&seeded))
            .map_err(|error| Failure::new("seed_execution", error.to_string(), EXIT_EXECUTION))
    })
}

fn describe(result: &SeedResult) -> String {
    let mut message = format!(
        "demo catalog seeded: {} inserted, {} already present",
        result.inserted.len(),
        result.skipped.len()
    );
    if !result.inserted.is_empty() {
        message.push_str(&format!(" (inserted: {})", result.inserted.join(", ")));
    }
    message
}
