use axum::extract::{Path, Query, State};
use domain::query::parse_id_list;
use domain::{Comment, FilterMap, ListParams};
use serde::Deserialize;

use crate::http::auth::Auth;
use crate::http::response::{ApiError, Envelope};
use crate::state::AppState;

// ?comment_id=1,2,3
#[derive(Deserialize)]
pub struct IdsQuery {
    pub comment_id: Option<String>,
}

impl IdsQuery {
    fn ids(&self, limit: usize) -> Vec<i64> {
        parse_id_list(self.comment_id.as_deref(), limit)
    }
}

pub async fn delete_multiple(
    State(state): State<AppState>,
    Auth(viewer): Auth,
    Query(query): Query<IdsQuery>,
) -> Result<Envelope<()>, ApiError> {
    viewer.manager_id_or_fail()?;

    let ids = query.ids(state.bulk_limit);
    state.comments.delete_multiple(&ids).await?;
    Ok(Envelope::empty())
}

pub async fn list_deleted(
    State(state): State<AppState>,
    Auth(viewer): Auth,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Envelope<Vec<Comment>>, ApiError> {
    viewer.manager_id_or_fail()?;

    let params = ListParams::from_query(query);
    let filter = FilterMap::from([("is_deleted".to_string(), true.into())]);
    let list = state
        .comments
        .get_list(filter, &params, &viewer, true)
        .await?;
    Ok(list.into())
}

pub async fn restore_multiple(
    State(state): State<AppState>,
    Auth(viewer): Auth,
    Query(query): Query<IdsQuery>,
) -> Result<Envelope<()>, ApiError> {
    viewer.manager_id_or_fail()?;

    let ids = query.ids(state.bulk_limit);
    state.comments.restore_multiple(&ids).await?;
    Ok(Envelope::empty())
}

pub async fn destroy_multiple(
    State(state): State<AppState>,
    Auth(viewer): Auth,
    Query(query): Query<IdsQuery>,
) -> Result<Envelope<()>, ApiError> {
    viewer.manager_id_or_fail()?;

    let ids = query.ids(state.bulk_limit);
    state.comments.destroy_multiple(&ids).await?;
    Ok(Envelope::empty())
}

pub async fn restore_one(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Auth(viewer): Auth,
) -> Result<Envelope<Comment>, ApiError> {
    viewer.manager_id_or_fail()?;

    state.comments.restore(comment_id).await?;
    let comment = state.comments.get_or_fail(comment_id, &viewer, true).await?;
    Ok(Envelope::data(comment))
}

pub async fn destroy_one(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Auth(viewer): Auth,
) -> Result<Envelope<()>, ApiError> {
    viewer.manager_id_or_fail()?;

    state.comments.destroy(comment_id).await?;
    Ok(Envelope::empty())
}
