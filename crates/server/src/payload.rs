use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use vitrine_core::domain::product::ProductFields;

use crate::error::ApiError;

/// Product fields read from either a JSON or an urlencoded form body.
///
/// Any body that cannot be decoded into [`ProductFields`] is rejected as a
/// validation failure rather than axum's default 400/415 answers.
#[derive(Debug)]
pub struct ProductPayload(pub ProductFields);

impl<S> FromRequest<S> for ProductPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(fields) = Form::<ProductFields>::from_request(req, state)
                .await
                .map_err(|rejection| invalid_body(rejection.body_text()))?;
            return Ok(Self(fields));
        }

        let Json(fields) = Json::<ProductFields>::from_request(req, state)
            .await
            .map_err(|rejection| invalid_body(rejection.body_text()))?;
        Ok(Self(fields))
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn invalid_body(detail: String) -> ApiError {
    ApiError::Validation(format!("Corpo da requisição inválido: {detail}"))
}
