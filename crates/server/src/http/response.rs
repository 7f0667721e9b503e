use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{Paginated, PaginationMeta};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// 统一的成功响应：`{"data": ..., "pagination": ...}`，两个字段都可省略
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<PaginationMeta>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            pagination: None,
        }
    }
}

impl Envelope<()> {
    pub fn empty() -> Self {
        Self {
            data: None,
            pagination: None,
        }
    }
}

impl<T: Serialize> From<Paginated<T>> for Envelope<Vec<T>> {
    fn from(page: Paginated<T>) -> Self {
        Self {
            data: Some(page.data),
            pagination: Some(page.pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug)]
pub struct ApiError(pub service::Error);

impl From<service::Error> for ApiError {
    fn from(e: service::Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use service::Error;

        let (status, kind) = match &self.0 {
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Error::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            Error::Storage(e) => {
                error!("Storage failure: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let message = match &self.0 {
            Error::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}
