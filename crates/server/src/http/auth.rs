use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use service::Viewer;
use storage::Db;
use tracing::debug;

use super::response::ApiError;

/// 从 `Authorization: Bearer <token>` 或 `token` 头解析调用者。
/// 没有令牌或令牌无效时为匿名用户，由各 handler 决定是否放行。
pub struct Auth(pub Viewer);

fn request_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    bearer
        .or_else(|| headers.get("token").and_then(|h| h.to_str().ok()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    Db: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = request_token(&parts.headers) else {
            return Ok(Auth(Viewer::anonymous()));
        };

        let db = Db::from_ref(state);
        let user = db
            .find_user_by_token(token)
            .await
            .map_err(service::Error::from)?;
        if user.is_none() {
            debug!("Ignoring unknown or expired token");
        }

        Ok(Auth(Viewer::from_user(user.as_ref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_is_read_from_either_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_token(&headers), None);

        headers.insert("token", HeaderValue::from_static("abc"));
        assert_eq!(request_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(request_token(&headers), Some("xyz"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        headers.remove("token");
        assert_eq!(request_token(&headers), None);
    }
}
