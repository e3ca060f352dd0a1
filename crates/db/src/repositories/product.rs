use chrono::{DateTime, Utc};
use sqlx::Row;

use vitrine_core::domain::product::{NewProduct, Product, ProductFields, ProductId};

use super::{fold_name, ProductRepository, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str =
    "id, name, description, color, weight, category, price, registered_at";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let color: String = row.try_get("color").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let weight: f64 = row.try_get("weight").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: f64 = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let registered_at_str: String =
        row.try_get("registered_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let registered_at = DateTime::parse_from_rfc3339(&registered_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            RepositoryError::Decode(format!(
                "product `{id}` has invalid registered_at `{registered_at_str}`: {e}"
            ))
        })?;

    Ok(Product {
        id: ProductId(id),
        name,
        description,
        color,
        weight,
        category,
        price,
        registered_at,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn create(&self, fields: NewProduct) -> Result<Product, RepositoryError> {
        let registered_at = Utc::now();
        let product =
            Product::from_new(ProductId::generate_at(registered_at), fields, registered_at);

        sqlx::query(
            "INSERT INTO product (id, name, name_folded, description, color, weight,
                                  category, price, registered_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(fold_name(&product.name))
        .bind(&product.description)
        .bind(&product.color)
        .bind(product.weight)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.registered_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY rowid ASC"))
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_name_case_insensitive(
        &self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE name_folded = ?
             ORDER BY rowid ASC
             LIMIT 1"
        ))
        .bind(fold_name(name))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn update_by_id(
        &self,
        id: &ProductId,
        fields: &ProductFields,
    ) -> Result<bool, RepositoryError> {
        if fields.is_empty() {
            let exists = sqlx::query("SELECT 1 FROM product WHERE id = ?")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;
            return Ok(exists.is_some());
        }

        // NULL parameters keep the stored value; SQLite counts every row the
        // WHERE clause matched, changed or not.
        let result = sqlx::query(
            "UPDATE product SET
                 name = COALESCE(?, name),
                 name_folded = COALESCE(?, name_folded),
                 description = COALESCE(?, description),
                 color = COALESCE(?, color),
                 weight = COALESCE(?, weight),
                 category = COALESCE(?, category),
                 price = COALESCE(?, price)
             WHERE id = ?",
        )
        .bind(fields.name.as_deref())
        .bind(fields.name.as_deref().map(fold_name))
        .bind(fields.description.as_deref())
        .bind(fields.color.as_deref())
        .bind(fields.weight)
        .bind(fields.category.as_deref())
        .bind(fields.price)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
