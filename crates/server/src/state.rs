use axum::extract::FromRef;
use service::{CommentLimits, CommentService};
use std::sync::Arc;
use storage::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub comments: CommentService,
    pub bulk_limit: usize,
}

impl AppState {
    pub fn new(db: Db, limits: CommentLimits, bulk_limit: usize) -> Self {
        let comments = CommentService::new(Arc::new(db.clone()), limits);
        Self {
            db,
            comments,
            bulk_limit,
        }
    }
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
