use async_trait::async_trait;
use thiserror::Error;

use vitrine_core::domain::product::{NewProduct, Product, ProductFields, ProductId};

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Durable storage of product documents.
///
/// Not-found is never an error: lookups return `None` and mutations report
/// whether a document was matched. `Err` is reserved for store failures.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persists a new product, assigning its identifier and registration time.
    async fn create(&self, fields: NewProduct) -> Result<Product, RepositoryError>;

    /// Every product in insertion order.
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Exact match on the whole name, ignoring case. The earliest inserted
    /// product wins when several names fold to the same value.
    async fn find_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Overwrites the fields present in `fields`. Returns whether a product
    /// with `id` existed.
    async fn update_by_id(
        &self,
        id: &ProductId,
        fields: &ProductFields,
    ) -> Result<bool, RepositoryError>;

    /// Returns whether a product was removed.
    async fn delete_by_id(&self, id: &ProductId) -> Result<bool, RepositoryError>;
}

/// Folded form of a product name used for case-insensitive lookup.
///
/// Uppercasing first maps context-dependent lowercase forms (Greek final
/// sigma) onto one letter.
pub(crate) fn fold_name(name: &str) -> String {
    name.to_uppercase().to_lowercase()
}
