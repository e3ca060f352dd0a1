use axum::{routing::get, Json, Router};
use utoipa::OpenApi;
use vitrine_core::domain::product::{Product, ProductFields};

use crate::error::{ErrorBody, MessageBody};
use crate::products;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "API de Produtos",
        description = "Cadastro de produtos com busca por ID ou por nome."
    ),
    paths(
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product
    ),
    components(schemas(Product, ProductFields, MessageBody, ErrorBody)),
    tags((name = "Produtos", description = "Gerenciamento de produtos"))
)]
pub struct ApiDoc;

pub fn router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
