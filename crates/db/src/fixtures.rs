//! Demo catalog used by `vitrine seed` and by tests that need a populated
//! store.

use tracing::info;
use vitrine_core::domain::product::NewProduct;

use crate::repositories::{ProductRepository, RepositoryError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: Vec<String>,
    pub skipped: Vec<String>,
}

pub fn demo_catalog() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Smartphone Modelo X".to_string(),
            description: "Um smartphone com câmera de 108MP.".to_string(),
            color: "Preto Grafite".to_string(),
            weight: 0.180,
            category: "Eletrônico".to_string(),
            price: 2999.90,
        },
        NewProduct {
            name: "Mouse".to_string(),
            description: "wireless".to_string(),
            color: "black".to_string(),
            weight: 0.1,
            category: "peripheral".to_string(),
            price: 49.9,
        },
        NewProduct {
            name: "Cadeira Ergonômica".to_string(),
            description: "Encosto em tela com apoio lombar ajustável.".to_string(),
            color: "Cinza".to_string(),
            weight: 14.2,
            category: "Móveis".to_string(),
            price: 1249.00,
        },
    ]
}

/// Inserts every demo product whose name is not already present, so running
/// it twice leaves a single copy of each.
pub async fn seed_demo_catalog(
    repository: &dyn ProductRepository,
) -> Result<SeedResult, RepositoryError> {
    let mut result = SeedResult { inserted: Vec::new(), skipped: Vec::new() };

    for product in demo_catalog() {
        if repository.find_by_name_case_insensitive(&product.name).await?.is_some() {
            result.skipped.push(product.name);
            continue;
        }

        let created = repository.create(product).await?;
        info!(
            event_name = "fixtures.seed.product_inserted",
            product_id = %created.id,
            product_name = %created.name,
            "demo product inserted"
        );
        result.inserted.push(created.name);
    }

    Ok(result)
}
