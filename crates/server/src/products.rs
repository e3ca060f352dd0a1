//! `/produtos` resource handlers.
//!
//! - `GET    /produtos`              list every product
//! - `GET    /produtos/{identifier}` look up by id, falling back to the name
//! - `POST   /produtos`              create from all six fields
//! - `PUT    /produtos/{id}`         overwrite the provided fields
//! - `DELETE /produtos/{id}`         remove

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, info};
use vitrine_core::domain::product::{Product, ProductFields, ProductId};
use vitrine_db::repositories::{ProductRepository, RepositoryError};

use crate::error::{ApiError, ErrorBody, MessageBody};
use crate::payload::ProductPayload;

pub const NOT_FOUND: &str = "Produto não encontrado.";
pub const NOT_FOUND_FOR_UPDATE: &str = "Produto não encontrado para atualização.";
pub const NOT_FOUND_FOR_DELETE: &str = "Produto não encontrado para exclusão.";
pub const CREATED: &str = "Produto cadastrado com sucesso!";
pub const DELETED: &str = "Produto deletado com sucesso!";

#[derive(Clone)]
pub struct ProductState {
    products: Arc<dyn ProductRepository>,
}

impl ProductState {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

pub fn router(state: ProductState) -> Router {
    Router::new()
        .route("/produtos", get(list_products).post(create_product))
        .route(
            "/produtos/{identifier}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/produtos",
    tag = "Produtos",
    responses(
        (status = 200, description = "A lista de todos os produtos.", body = [Product]),
        (status = 500, description = "Falha ao consultar o banco de dados.", body = ErrorBody)
    )
)]
pub async fn list_products(
    State(state): State<ProductState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.find_all().await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/produtos/{identifier}",
    tag = "Produtos",
    params(("identifier" = String, Path, description = "O ID ou o nome do produto")),
    responses(
        (status = 200, description = "O produto encontrado.", body = Product),
        (status = 404, description = "Produto não encontrado.", body = MessageBody),
        (status = 500, description = "Falha ao consultar o banco de dados.", body = ErrorBody)
    )
)]
pub async fn get_product(
    State(state): State<ProductState>,
    Path(identifier): Path<String>,
) -> Result<Json<Product>, ApiError> {
    resolve_product(state.products.as_ref(), &identifier)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

#[utoipa::path(
    post,
    path = "/produtos",
    tag = "Produtos",
    request_body = ProductFields,
    responses(
        (status = 201, description = "Produto cadastrado com sucesso.", body = MessageBody),
        (status = 422, description = "Campos obrigatórios ausentes.", body = ErrorBody),
        (status = 500, description = "Falha ao gravar no banco de dados.", body = ErrorBody)
    )
)]
pub async fn create_product(
    State(state): State<ProductState>,
    ProductPayload(fields): ProductPayload,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let new_product = fields.require_all()?;
    let created = state.products.create(new_product).await?;

    info!(
        event_name = "product.created",
        product_id = %created.id,
        product_name = %created.name,
        "product created"
    );
    Ok((StatusCode::CREATED, Json(MessageBody::new(CREATED))))
}

#[utoipa::path(
    put,
    path = "/produtos/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "O ID do produto")),
    request_body = ProductFields,
    responses(
        (status = 200, description = "Os campos enviados, já gravados.", body = ProductFields),
        (status = 404, description = "Produto não encontrado.", body = MessageBody),
        (status = 422, description = "Campo enviado vazio ou corpo inválido.", body = ErrorBody),
        (status = 500, description = "Falha ao gravar no banco de dados.", body = ErrorBody)
    )
)]
pub async fn update_product(
    State(state): State<ProductState>,
    Path(id): Path<String>,
    ProductPayload(fields): ProductPayload,
) -> Result<Json<ProductFields>, ApiError> {
    let id = ProductId::parse(&id).ok_or(ApiError::NotFound(NOT_FOUND_FOR_UPDATE))?;
    fields.check_provided()?;

    if !state.products.update_by_id(&id, &fields).await? {
        return Err(ApiError::NotFound(NOT_FOUND_FOR_UPDATE));
    }

    info!(event_name = "product.updated", product_id = %id, "product updated");
    Ok(Json(fields))
}

#[utoipa::path(
    delete,
    path = "/produtos/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "O ID do produto")),
    responses(
        (status = 200, description = "Produto deletado com sucesso.", body = MessageBody),
        (status = 404, description = "Produto não encontrado.", body = MessageBody),
        (status = 500, description = "Falha ao remover do banco de dados.", body = ErrorBody)
    )
)]
pub async fn delete_product(
    State(state): State<ProductState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = ProductId::parse(&id).ok_or(ApiError::NotFound(NOT_FOUND_FOR_DELETE))?;

    if !state.products.delete_by_id(&id).await? {
        return Err(ApiError::NotFound(NOT_FOUND_FOR_DELETE));
    }

    info!(event_name = "product.deleted", product_id = %id, "product deleted");
    Ok(Json(MessageBody::new(DELETED)))
}

/// Identifier-shaped input is tried as an id first; anything that did not
/// match is then tried as a case-insensitive name.
pub async fn resolve_product(
    products: &dyn ProductRepository,
    identifier: &str,
) -> Result<Option<Product>, RepositoryError> {
    if let Some(id) = ProductId::parse(identifier) {
        if let Some(product) = products.find_by_id(&id).await? {
            return Ok(Some(product));
        }
        debug!(
            event_name = "product.lookup.id_miss",
            identifier = %identifier,
            "no product with this id, trying name"
        );
    }

    products.find_by_name_case_insensitive(identifier).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        Json,
    };
    use vitrine_core::domain::product::{NewProduct, Product, ProductFields, ProductId};
    use vitrine_db::repositories::{InMemoryProductRepository, ProductRepository, RepositoryError};

    use super::{
        create_product, delete_product, get_product, list_products, resolve_product,
        update_product, ProductState, CREATED, DELETED, NOT_FOUND, NOT_FOUND_FOR_DELETE,
        NOT_FOUND_FOR_UPDATE,
    };
    use crate::error::ApiError;
    use crate::payload::ProductPayload;

    struct UnavailableStore;

    #[async_trait]
    impl ProductRepository for UnavailableStore {
        async fn create(&self, _fields: NewProduct) -> Result<Product, RepositoryError> {
            Err(unavailable())
        }

        async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
            Err(unavailable())
        }

        async fn find_by_id(&self, _id: &ProductId) -> Result<Option<Product>, RepositoryError> {
            Err(unavailable())
        }

        async fn find_by_name_case_insensitive(
            &self,
            _name: &str,
        ) -> Result<Option<Product>, RepositoryError> {
            Err(unavailable())
        }

        async fn update_by_id(
            &self,
            _id: &ProductId,
            _fields: &ProductFields,
        ) -> Result<bool, RepositoryError> {
            Err(unavailable())
        }

        async fn delete_by_id(&self, _id: &ProductId) -> Result<bool, RepositoryError> {
            Err(unavailable())
        }
    }

    fn unavailable() -> RepositoryError {
        RepositoryError::Database(sqlx::Error::PoolClosed)
    }

    fn mouse() -> NewProduct {
        NewProduct {
            name: "Mouse".to_string(),
            description: "wireless".to_string(),
            color: "black".to_string(),
            weight: 0.1,
            category: "peripheral".to_string(),
            price: 49.9,
        }
    }

    async fn state_with_mouse() -> (ProductState, Product) {
        let repo = Arc::new(InMemoryProductRepository::default());
        let created = repo.create(mouse()).await.expect("seed mouse");
        (ProductState::new(repo), created)
    }

    fn empty_state() -> ProductState {
        ProductState::new(Arc::new(InMemoryProductRepository::default()))
    }

    fn failing_state() -> ProductState {
        ProductState::new(Arc::new(UnavailableStore))
    }

    #[tokio::test]
    async fn list_returns_empty_array_for_empty_store() {
        let Json(products) = list_products(State(empty_state())).await.expect("list");

        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn list_surfaces_store_failure() {
        let result = list_products(State(failing_state())).await;

        assert!(matches!(result, Err(ApiError::Store(_))));
    }

    #[tokio::test]
    async fn get_finds_by_id_in_either_case() {
        let (state, created) = state_with_mouse().await;

        let Json(found) =
            get_product(State(state), Path(created.id.as_str().to_ascii_uppercase()))
                .await
                .expect("get by upper-case id");

        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn get_falls_back_to_case_insensitive_name() {
        let (state, created) = state_with_mouse().await;

        let Json(found) =
            get_product(State(state), Path("MOUSE".to_string())).await.expect("get by name");

        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn get_unknown_identifier_is_not_found() {
        let (state, _created) = state_with_mouse().await;

        for identifier in ["0123456789abcdef01234567", "Teclado", "Mous"] {
            let result = get_product(State(state.clone()), Path(identifier.to_string())).await;
            assert!(
                matches!(result, Err(ApiError::NotFound(message)) if message == NOT_FOUND),
                "`{identifier}` should not resolve"
            );
        }
    }

    #[tokio::test]
    async fn identifier_shaped_name_resolves_through_fallback() {
        let repo = InMemoryProductRepository::default();
        let hex_name = "cafebabecafebabecafebabe";
        let created = repo
            .create(NewProduct { name: hex_name.to_string(), ..mouse() })
            .await
            .expect("create");

        let found = resolve_product(&repo, hex_name).await.expect("resolve");

        assert_eq!(found.map(|product| product.id), Some(created.id));
    }

    #[tokio::test]
    async fn duplicate_names_resolve_to_the_earliest_product() {
        let registered_at = chrono::Utc::now();
        let older =
            Product::from_new(ProductId::generate_at(registered_at), mouse(), registered_at);
        let newer = Product {
            id: ProductId::generate_at(registered_at),
            name: "MOUSE".to_string(),
            price: 19.9,
            ..older.clone()
        };
        let state = ProductState::new(Arc::new(InMemoryProductRepository::with_products(vec![
            older.clone(),
            newer.clone(),
        ])));

        let Json(found) =
            get_product(State(state.clone()), Path("mouse".to_string())).await.expect("get");
        assert_eq!(found, older);

        let Json(listed) = list_products(State(state)).await.expect("list");
        assert_eq!(listed, vec![older, newer]);
    }

    #[tokio::test]
    async fn create_with_all_fields_is_created() {
        let state = empty_state();

        let (status, Json(body)) =
            create_product(State(state.clone()), ProductPayload(ProductFields::from(mouse())))
                .await
                .expect("create");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, CREATED);
        let Json(listed) = list_products(State(state)).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Mouse");
    }

    #[tokio::test]
    async fn create_rejects_missing_empty_or_zero_fields() {
        let state = empty_state();
        let cases = [
            ProductFields { name: None, ..ProductFields::from(mouse()) },
            ProductFields { color: Some(String::new()), ..ProductFields::from(mouse()) },
            ProductFields { weight: Some(0.0), ..ProductFields::from(mouse()) },
            ProductFields { price: Some(0.0), ..ProductFields::from(mouse()) },
            ProductFields::default(),
        ];

        for fields in cases {
            let result = create_product(State(state.clone()), ProductPayload(fields)).await;
            assert!(matches!(result, Err(ApiError::Validation(_))));
        }

        let Json(listed) = list_products(State(state)).await.expect("list");
        assert!(listed.is_empty(), "rejected bodies must not create products");
    }

    #[tokio::test]
    async fn update_returns_submitted_fields_and_persists_them() {
        let (state, created) = state_with_mouse().await;
        let fields = ProductFields { price: Some(39.9), ..ProductFields::default() };

        let Json(echoed) = update_product(
            State(state.clone()),
            Path(created.id.to_string()),
            ProductPayload(fields.clone()),
        )
        .await
        .expect("update");

        assert_eq!(echoed, fields);
        let Json(found) =
            get_product(State(state), Path(created.id.to_string())).await.expect("get");
        assert_eq!(found.price, 39.9);
        assert_eq!(found.name, "Mouse");
    }

    #[tokio::test]
    async fn update_rejects_provided_empty_text() {
        let (state, created) = state_with_mouse().await;

        let result = update_product(
            State(state),
            Path(created.id.to_string()),
            ProductPayload(ProductFields { name: Some(String::new()), ..ProductFields::default() }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn update_of_unknown_or_malformed_id_is_not_found() {
        let (state, created) = state_with_mouse().await;

        for id in ["0123456789abcdef01234567", "Mouse", "not-an-id"] {
            let result = update_product(
                State(state.clone()),
                Path(id.to_string()),
                ProductPayload(ProductFields { price: Some(1.0), ..ProductFields::default() }),
            )
            .await;
            assert!(
                matches!(
                    result,
                    Err(ApiError::NotFound(message)) if message == NOT_FOUND_FOR_UPDATE
                ),
                "`{id}`"
            );
        }

        let Json(unchanged) =
            get_product(State(state), Path(created.id.to_string())).await.expect("get");
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn delete_succeeds_once_then_reports_not_found() {
        let (state, created) = state_with_mouse().await;

        let Json(body) = delete_product(State(state.clone()), Path(created.id.to_string()))
            .await
            .expect("delete");
        assert_eq!(body.message, DELETED);

        let again = delete_product(State(state.clone()), Path(created.id.to_string())).await;
        assert!(matches!(
            again,
            Err(ApiError::NotFound(message)) if message == NOT_FOUND_FOR_DELETE
        ));

        let lookup = get_product(State(state), Path(created.id.to_string())).await;
        assert!(matches!(lookup, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_with_malformed_id_is_not_found() {
        let (state, _created) = state_with_mouse().await;

        let result = delete_product(State(state), Path("Mouse".to_string())).await;

        assert!(matches!(
            result,
            Err(ApiError::NotFound(message)) if message == NOT_FOUND_FOR_DELETE
        ));
    }

    #[tokio::test]
    async fn store_failures_surface_from_every_handler() {
        let id = ProductId::generate().to_string();

        assert!(matches!(
            get_product(State(failing_state()), Path(id.clone())).await,
            Err(ApiError::Store(_))
        ));
        assert!(matches!(
            create_product(State(failing_state()), ProductPayload(ProductFields::from(mouse())))
                .await,
            Err(ApiError::Store(_))
        ));
        assert!(matches!(
            update_product(
                State(failing_state()),
                Path(id.clone()),
                ProductPayload(ProductFields::default())
            )
            .await,
            Err(ApiError::Store(_))
        ));
        assert!(matches!(
            delete_product(State(failing_state()), Path(id)).await,
            Err(ApiError::Store(_))
        ));
    }
}
