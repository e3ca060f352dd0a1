use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use vitrine_db::{repositories::ProductRepository, DbPool};

use crate::error::MessageBody;
use crate::products::{self, ProductState};
use crate::{docs, health};

pub const WELCOME: &str = "Bem-vindo à API de Produtos!";
pub const ROUTE_NOT_FOUND: &str = "Rota não encontrada.";

/// Product API, root greeting and OpenAPI document.
pub fn router(products: Arc<dyn ProductRepository>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .merge(products::router(ProductState::new(products)))
        .merge(docs::router())
        .fallback(route_not_found)
}

/// Everything the server binary exposes, with request tracing.
pub fn app(products: Arc<dyn ProductRepository>, db_pool: DbPool) -> Router {
    router(products).merge(health::router(db_pool)).layer(TraceLayer::new_for_http())
}

async fn welcome() -> Json<MessageBody> {
    Json(MessageBody::new(WELCOME))
}

async fn route_not_found() -> (StatusCode, Json<MessageBody>) {
    (StatusCode::NOT_FOUND, Json(MessageBody::new(ROUTE_NOT_FOUND)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use vitrine_db::repositories::{InMemoryProductRepository, SqlProductRepository};
    use vitrine_db::{connect_with_settings, migrations};

    use super::{app, router, ROUTE_NOT_FOUND, WELCOME};

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response =
            app.clone().oneshot(request.body(body).expect("request")).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json response")
        };
        (status, value)
    }

    async fn send_form(
        app: &Router,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json response"))
    }

    fn mouse() -> Value {
        json!({
            "nome": "Mouse",
            "descricao": "wireless",
            "cor": "black",
            "peso": 0.1,
            "tipo": "peripheral",
            "preco": 49.9
        })
    }

    fn in_memory() -> Router {
        router(Arc::new(InMemoryProductRepository::default()))
    }

    #[tokio::test]
    async fn root_greets() {
        let (status, body) = send(&in_memory(), Method::GET, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], WELCOME);
    }

    #[tokio::test]
    async fn mouse_lifecycle_against_sqlite() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");
        let app = app(Arc::new(SqlProductRepository::new(pool.clone())), pool);

        let (status, body) = send(&app, Method::POST, "/produtos", Some(mouse())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Produto cadastrado com sucesso!");

        let (status, found) = send(&app, Method::GET, "/produtos/Mouse", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["nome"], "Mouse");
        let id = found["_id"].as_str().expect("_id").to_string();
        assert!(found["dataCadastro"].is_string());

        let mut changed = mouse();
        changed["preco"] = json!(39.9);
        let (status, echoed) =
            send(&app, Method::PUT, &format!("/produtos/{id}"), Some(changed.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(echoed, changed);

        let (status, found) = send(&app, Method::GET, &format!("/produtos/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["preco"], 39.9);

        let (status, body) = send(&app, Method::DELETE, &format!("/produtos/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Produto deletado com sucesso!");

        let (status, body) = send(&app, Method::GET, &format!("/produtos/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Produto não encontrado.");

        let (status, body) = send(&app, Method::DELETE, &format!("/produtos/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Produto não encontrado para exclusão.");

        let (status, health) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ready");
    }

    #[tokio::test]
    async fn incomplete_create_is_unprocessable_and_stores_nothing() {
        let app = in_memory();
        let mut incomplete = mouse();
        incomplete["cor"] = json!("");

        let (status, body) = send(&app, Method::POST, "/produtos", Some(incomplete)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Todos os campos são obrigatórios!");

        let (status, listed) = send(&app, Method::GET, "/produtos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn form_encoded_create_is_accepted() {
        let app = in_memory();
        let (status, _) = send_form(
            &app,
            Method::POST,
            "/produtos",
            "nome=Mouse&descricao=wireless&cor=black&peso=0.1&tipo=peripheral&preco=49.9",
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, found) = send(&app, Method::GET, "/produtos/mouse", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["peso"], 0.1);
    }

    #[tokio::test]
    async fn non_finite_numbers_are_rejected_on_create() {
        let app = in_memory();

        let (status, body) = send_form(
            &app,
            Method::POST,
            "/produtos",
            "nome=Mouse&descricao=wireless&cor=black&peso=inf&tipo=peripheral&preco=infinity",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Todos os campos são obrigatórios!");

        let (status, listed) = send(&app, Method::GET, "/produtos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn non_finite_numbers_are_rejected_on_update() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool");
        migrations::run_pending(&pool).await.expect("migrations");
        let app = router(Arc::new(SqlProductRepository::new(pool)));
        let (status, _) = send(&app, Method::POST, "/produtos", Some(mouse())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, found) = send(&app, Method::GET, "/produtos/Mouse", None).await;
        let id = found["_id"].as_str().expect("_id").to_string();

        let (status, body) =
            send_form(&app, Method::PUT, &format!("/produtos/{id}"), "peso=NaN").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "O campo `peso` deve ser um número válido.");

        let (status, found) = send(&app, Method::GET, &format!("/produtos/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["peso"], 0.1);
    }

    #[tokio::test]
    async fn unmatched_paths_answer_with_json_not_found() {
        let app = in_memory();

        for uri in ["/produtos/", "/nada"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["message"], ROUTE_NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_unprocessable() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/produtos")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{\"nome\": "))
            .expect("request");

        let response = in_memory().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found() {
        let (status, body) = send(
            &in_memory(),
            Method::PUT,
            "/produtos/0123456789abcdef01234567",
            Some(json!({ "preco": 10.0 })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Produto não encontrado para atualização.");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, document) =
            send(&in_memory(), Method::GET, "/api-docs/openapi.json", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(document["openapi"].as_str().is_some_and(|version| version.starts_with('3')));
        assert!(document["paths"]["/produtos"].is_object());
    }
}
