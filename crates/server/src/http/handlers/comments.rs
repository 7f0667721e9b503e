use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use domain::{Comment, FilterMap, ListParams, ResourceType, Voter};
use serde::{Deserialize, Serialize};

use crate::http::auth::Auth;
use crate::http::response::{ApiError, Envelope};
use crate::state::AppState;

// --- DTOs ---

#[derive(Deserialize)]
pub struct ContentRequest {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "type")]
    pub vote_type: Option<String>,
}

#[derive(Serialize)]
pub struct VoteCount {
    pub vote_count: i64,
}

type ApiResult<T> = Result<Envelope<T>, ApiError>;

fn user_filter(user_id: i64) -> FilterMap {
    FilterMap::from([("user_id".to_string(), user_id.into())])
}

// --- Handlers ---

pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Auth(viewer): Auth,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Comment>> {
    let params = ListParams::from_query(query);
    let list = state
        .comments
        .get_list(user_filter(user_id), &params, &viewer, true)
        .await?;
    Ok(list.into())
}

pub async fn list_mine(
    State(state): State<AppState>,
    Auth(viewer): Auth,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Comment>> {
    let user_id = viewer.user_id_or_fail()?;
    let params = ListParams::from_query(query);
    let list = state
        .comments
        .get_list(user_filter(user_id), &params, &viewer, true)
        .await?;
    Ok(list.into())
}

pub async fn list_all(
    State(state): State<AppState>,
    Auth(viewer): Auth,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Comment>> {
    let params = ListParams::from_query(query);
    let list = state
        .comments
        .get_list(FilterMap::new(), &params, &viewer, true)
        .await?;
    Ok(list.into())
}

pub async fn list_by_resource(
    State(state): State<AppState>,
    Extension(resource_type): Extension<ResourceType>,
    Path(resource_id): Path<i64>,
    Auth(viewer): Auth,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Comment>> {
    let params = ListParams::from_query(query);
    let filter = FilterMap::from([
        ("resource_type".to_string(), resource_type.as_str().into()),
        ("resource_id".to_string(), resource_id.into()),
    ]);
    let list = state
        .comments
        .get_list(filter, &params, &viewer, true)
        .await?;
    Ok(list.into())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(resource_type): Extension<ResourceType>,
    Path(resource_id): Path<i64>,
    Auth(viewer): Auth,
    Json(payload): Json<ContentRequest>,
) -> ApiResult<Comment> {
    let user_id = viewer.user_id_or_fail()?;
    let content = payload.content.unwrap_or_default();
    let comment = state
        .comments
        .create(user_id, resource_type, resource_id, &content)
        .await?;
    Ok(Envelope::data(comment))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Auth(viewer): Auth,
) -> ApiResult<Comment> {
    let comment = state.comments.get_or_fail(comment_id, &viewer, true).await?;
    Ok(Envelope::data(comment))
}

pub async fn update_one(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Auth(viewer): Auth,
    Json(payload): Json<ContentRequest>,
) -> ApiResult<Comment> {
    viewer.user_id_or_fail()?;
    let existing = state
        .comments
        .get_or_fail(comment_id, &viewer, false)
        .await?;
    viewer.owner_or_manager_or_fail(existing.user_id)?;

    let content = payload.content.unwrap_or_default();
    state.comments.update(comment_id, &content).await?;
    let comment = state.comments.get_or_fail(comment_id, &viewer, true).await?;
    Ok(Envelope::data(comment))
}

pub async fn delete_one(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Auth(viewer): Auth,
) -> ApiResult<()> {
    viewer.user_id_or_fail()?;
    // 已在回收站的评论作者也能再次删除，结果不变
    let author_id = state.comments.author_of(comment_id).await?;
    viewer.owner_or_manager_or_fail(author_id)?;

    state.comments.delete(comment_id).await?;
    Ok(Envelope::empty())
}

pub async fn list_voters(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Voter>> {
    let params = ListParams::from_query(query);
    let vote_type = params
        .filters
        .iter()
        .find(|(k, _)| k == "type")
        .map(|(_, v)| v.as_str());

    let voters = state
        .comments
        .get_voters(comment_id, vote_type, &params, true)
        .await?;
    Ok(voters.into())
}

pub async fn add_vote(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Auth(viewer): Auth,
    Json(payload): Json<VoteRequest>,
) -> ApiResult<VoteCount> {
    let user_id = viewer.user_id_or_fail()?;
    let vote_type = payload.vote_type.unwrap_or_default();

    state
        .comments
        .add_vote(user_id, comment_id, &vote_type)
        .await?;
    let vote_count = state.comments.get_vote_count(comment_id).await?;
    Ok(Envelope::data(VoteCount { vote_count }))
}

pub async fn delete_vote(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Auth(viewer): Auth,
) -> ApiResult<VoteCount> {
    let user_id = viewer.user_id_or_fail()?;

    state.comments.delete_vote(user_id, comment_id).await?;
    let vote_count = state.comments.get_vote_count(comment_id).await?;
    Ok(Envelope::data(VoteCount { vote_count }))
}
