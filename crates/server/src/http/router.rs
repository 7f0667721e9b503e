use super::handlers::{admin, comments, health};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, MethodRouter},
    Extension, Router,
};
use domain::ResourceType;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];

fn build_cors(allowed_origins: &str) -> CorsLayer {
    if allowed_origins == "*" {
        return CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        tracing::info!("CORS enabled for origins: {:?}", origins);
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(origins)
            .allow_headers(Any)
    }
}

// 问题、回答、文章下的评论共用同一组 handler
fn resource_comments(resource_type: ResourceType) -> MethodRouter<AppState> {
    get(comments::list_by_resource)
        .post(comments::create)
        .layer(Extension(resource_type))
}

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/users/:user_id/comments", get(comments::list_by_user))
        .route("/api/user/comments", get(comments::list_mine))
        .route(
            "/api/comments",
            get(comments::list_all).delete(admin::delete_multiple),
        )
        .route(
            "/api/comments/:comment_id",
            get(comments::get_one)
                .patch(comments::update_one)
                .delete(comments::delete_one),
        )
        .route(
            "/api/comments/:comment_id/voters",
            get(comments::list_voters)
                .post(comments::add_vote)
                .delete(comments::delete_vote),
        )
        .route(
            "/api/trash/comments",
            get(admin::list_deleted)
                .post(admin::restore_multiple)
                .delete(admin::destroy_multiple),
        )
        .route(
            "/api/trash/comments/:comment_id",
            post(admin::restore_one).delete(admin::destroy_one),
        )
        .route(
            "/api/questions/:resource_id/comments",
            resource_comments(ResourceType::Question),
        )
        .route(
            "/api/answers/:resource_id/comments",
            resource_comments(ResourceType::Answer),
        )
        .route(
            "/api/articles/:resource_id/comments",
            resource_comments(ResourceType::Article),
        )
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(allowed_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use service::CommentLimits;
    use storage::{Db, NewUser};
    use tower::ServiceExt;

    struct Fixture {
        app: Router,
        author: i64,
    }

    async fn add_user(db: &Db, name: &str, is_manager: bool) -> i64 {
        let id = db
            .insert_user(&NewUser {
                username: name.to_string(),
                email: None,
                avatar: None,
                headline: None,
                is_manager,
            })
            .await
            .unwrap();
        db.insert_token(name, id, Utc::now().naive_utc() + Duration::hours(1))
            .await
            .unwrap();
        id
    }

    async fn fixture() -> Fixture {
        let db = Db::new("sqlite::memory:").await.unwrap();
        let author = add_user(&db, "author", false).await;
        add_user(&db, "other", false).await;
        add_user(&db, "admin", true).await;

        let state = AppState::new(db, CommentLimits::default(), 100);
        Fixture {
            app: build_router(state, "*"),
            author,
        }
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header("Authorization", format!("Bearer {}", t));
        }
        let req = match body {
            Some(b) => req
                .header("content-type", "application/json")
                .body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        send(app, Method::GET, uri, token, None).await
    }

    async fn post_comment(app: &Router, token: &str, content: &str) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/questions/1/comments",
            Some(token),
            Some(json!({ "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn list_wraps_data_and_pagination() {
        let f = fixture().await;
        post_comment(&f.app, "author", "first").await;
        post_comment(&f.app, "other", "second").await;

        let (status, body) = get(&f.app, "/api/comments?per_page=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["pagination"]["next"], 2);
        assert_eq!(body["data"][0]["relationships"]["voting"], Value::Null);

        let uri = format!("/api/users/{}/comments", f.author);
        let (_, body) = get(&f.app, &uri, None).await;
        assert_eq!(body["data"][0]["content"], "first");

        let (_, body) = get(&f.app, "/api/questions/1/comments", None).await;
        assert_eq!(body["pagination"]["total"], 2);
        let (_, body) = get(&f.app, "/api/articles/1/comments", None).await;
        assert_eq!(body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn own_list_requires_login() {
        let f = fixture().await;
        post_comment(&f.app, "author", "mine").await;
        post_comment(&f.app, "other", "theirs").await;

        let (status, body) = get(&f.app, "/api/user/comments", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, body) = get(&f.app, "/api/user/comments", Some("author")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["data"][0]["content"], "mine");
    }

    #[tokio::test]
    async fn only_author_or_manager_can_update() {
        let f = fixture().await;
        let id = post_comment(&f.app, "author", "draft").await;
        let uri = format!("/api/comments/{}", id);
        let edit = json!({ "content": "final" });

        let (status, _) = send(&f.app, Method::PATCH, &uri, None, Some(edit.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &f.app,
            Method::PATCH,
            &uri,
            Some("other"),
            Some(edit.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, body) =
            send(&f.app, Method::PATCH, &uri, Some("author"), Some(edit)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], "final");

        let (status, body) = send(
            &f.app,
            Method::PATCH,
            &uri,
            Some("admin"),
            Some(json!({ "content": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn voting_reports_live_count() {
        let f = fixture().await;
        let id = post_comment(&f.app, "author", "vote me").await;
        let uri = format!("/api/comments/{}/voters", id);

        let up = json!({ "type": "up" });
        let (status, _) = send(&f.app, Method::POST, &uri, None, Some(up)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &f.app,
            Method::POST,
            &uri,
            Some("other"),
            Some(json!({ "type": "up" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["vote_count"], 1);

        let (status, _) = send(
            &f.app,
            Method::POST,
            &uri,
            Some("other"),
            Some(json!({ "type": "bogus" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = get(&f.app, &uri, None).await;
        assert_eq!(body["data"][0]["user"]["username"], "other");
        assert_eq!(body["data"][0]["type"], "up");

        let detail = format!("/api/comments/{}", id);
        let (_, body) = get(&f.app, &detail, Some("other")).await;
        assert_eq!(body["data"]["relationships"]["voting"], "up");

        let (_, body) = send(&f.app, Method::DELETE, &uri, Some("other"), None).await;
        assert_eq!(body["data"]["vote_count"], 0);
    }

    #[tokio::test]
    async fn trash_workflow_is_manager_only() {
        let f = fixture().await;
        let a = post_comment(&f.app, "author", "a").await;
        let b = post_comment(&f.app, "author", "b").await;
        let bulk = format!("/api/comments?comment_id={},{}", a, b);

        let (status, _) = send(&f.app, Method::DELETE, &bulk, Some("author"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&f.app, Method::DELETE, &bulk, Some("admin"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (_, body) = get(&f.app, "/api/comments", None).await;
        assert_eq!(body["pagination"]["total"], 0);

        let (status, _) = get(&f.app, "/api/trash/comments", Some("other")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (_, body) = get(&f.app, "/api/trash/comments", Some("admin")).await;
        assert_eq!(body["pagination"]["total"], 2);

        let restore = format!("/api/trash/comments/{}", a);
        let (status, body) = send(&f.app, Method::POST, &restore, Some("admin"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_deleted"], false);

        let (status, _) = send(&f.app, Method::DELETE, &restore, Some("admin"), None).await;
        assert_eq!(status, StatusCode::OK);
        let detail_a = format!("/api/comments/{}", a);
        let (status, body) = get(&f.app, &detail_a, Some("admin")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let destroy_rest = format!("/api/trash/comments?comment_id={}", b);
        let (status, _) = send(&f.app, Method::DELETE, &destroy_rest, Some("admin"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = get(&f.app, "/api/trash/comments", Some("admin")).await;
        assert_eq!(body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn author_can_soft_delete_own_comment() {
        let f = fixture().await;
        let id = post_comment(&f.app, "author", "oops").await;
        let uri = format!("/api/comments/{}", id);

        let (status, _) = send(&f.app, Method::DELETE, &uri, Some("other"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&f.app, Method::DELETE, &uri, Some("author"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (status, _) = get(&f.app, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&f.app, Method::DELETE, &uri, Some("admin"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn author_can_delete_twice() {
        let f = fixture().await;
        let id = post_comment(&f.app, "author", "twice").await;
        let uri = format!("/api/comments/{}", id);

        for _ in 0..2 {
            let (status, body) = send(&f.app, Method::DELETE, &uri, Some("author"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({}));
        }

        let (_, body) = get(&f.app, "/api/trash/comments", Some("admin")).await;
        assert_eq!(body["pagination"]["total"], 1);

        let (status, _) = send(&f.app, Method::DELETE, &uri, Some("other"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let missing = "/api/comments/9999";
        let (status, _) = send(&f.app, Method::DELETE, missing, Some("author"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let f = fixture().await;
        let (status, body) = get(&f.app, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
