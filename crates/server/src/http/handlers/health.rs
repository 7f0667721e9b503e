use axum::{extract::State, Json};
use storage::Db;

use crate::http::response::ApiError;

pub async fn health(State(db): State<Db>) -> Result<Json<serde_json::Value>, ApiError> {
    db.ping().await.map_err(service::Error::from)?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
