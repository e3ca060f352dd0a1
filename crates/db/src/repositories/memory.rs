use chrono::Utc;
use tokio::sync::RwLock;

use vitrine_core::domain::product::{NewProduct, Product, ProductFields, ProductId};

use super::{fold_name, ProductRepository, RepositoryError};

/// Vec-backed store; insertion order is preserved for `find_all` and for
/// resolving duplicate names.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, fields: NewProduct) -> Result<Product, RepositoryError> {
        let registered_at = Utc::now();
        let product =
            Product::from_new(ProductId::generate_at(registered_at), fields, registered_at);

        let mut products = self.products.write().await;
        products.push(product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.clone())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    async fn find_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let folded = fold_name(name);
        let products = self.products.read().await;
        Ok(products.iter().find(|product| fold_name(&product.name) == folded).cloned())
    }

    async fn update_by_id(
        &self,
        id: &ProductId,
        fields: &ProductFields,
    ) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|product| &product.id == id) {
            Some(product) => {
                product.apply(fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| &product.id != id);
        Ok(products.len() < before)
    }
}
