use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::{Comment, CommentCriteria, NewComment, OrderBy, Pagination, User, Vote, VoteType};
use std::collections::HashMap;
use storage::Db;

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find(
        &self,
        criteria: &CommentCriteria,
        order: &[OrderBy],
        page: Pagination,
    ) -> anyhow::Result<(Vec<Comment>, i64)>;

    async fn find_one(&self, id: i64) -> anyhow::Result<Option<Comment>>;

    async fn insert(&self, comment: &NewComment) -> anyhow::Result<i64>;

    async fn update_content(
        &self,
        id: i64,
        content: &str,
        now: NaiveDateTime,
    ) -> anyhow::Result<u64>;

    async fn set_deleted(
        &self,
        ids: &[i64],
        deleted: bool,
        now: NaiveDateTime,
    ) -> anyhow::Result<u64>;

    async fn destroy(&self, ids: &[i64]) -> anyhow::Result<u64>;

    async fn insert_or_update_vote(
        &self,
        user_id: i64,
        comment_id: i64,
        vote_type: VoteType,
        now: NaiveDateTime,
    ) -> anyhow::Result<()>;

    async fn delete_vote(&self, user_id: i64, comment_id: i64) -> anyhow::Result<u64>;

    async fn count_votes(&self, comment_id: i64, vote_type: Option<VoteType>)
        -> anyhow::Result<i64>;

    async fn user_votes(
        &self,
        user_id: i64,
        comment_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, VoteType>>;

    async fn find_votes(
        &self,
        comment_id: i64,
        vote_type: Option<VoteType>,
        page: Pagination,
    ) -> anyhow::Result<(Vec<Vote>, i64)>;

    async fn find_users(&self, ids: &[i64]) -> anyhow::Result<Vec<User>>;
}

#[async_trait]
impl CommentStore for Db {
    async fn find(
        &self,
        criteria: &CommentCriteria,
        order: &[OrderBy],
        page: Pagination,
    ) -> anyhow::Result<(Vec<Comment>, i64)> {
        self.list_comments(criteria, order, page).await
    }

    async fn find_one(&self, id: i64) -> anyhow::Result<Option<Comment>> {
        self.get_comment(id).await
    }

    async fn insert(&self, comment: &NewComment) -> anyhow::Result<i64> {
        self.insert_comment(comment).await
    }

    async fn update_content(
        &self,
        id: i64,
        content: &str,
        now: NaiveDateTime,
    ) -> anyhow::Result<u64> {
        self.update_comment_content(id, content, now).await
    }

    async fn set_deleted(
        &self,
        ids: &[i64],
        deleted: bool,
        now: NaiveDateTime,
    ) -> anyhow::Result<u64> {
        self.set_comments_deleted(ids, deleted, now).await
    }

    async fn destroy(&self, ids: &[i64]) -> anyhow::Result<u64> {
        self.destroy_comments(ids).await
    }

    async fn insert_or_update_vote(
        &self,
        user_id: i64,
        comment_id: i64,
        vote_type: VoteType,
        now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        self.upsert_vote(user_id, comment_id, vote_type, now).await
    }

    async fn delete_vote(&self, user_id: i64, comment_id: i64) -> anyhow::Result<u64> {
        Db::delete_vote(self, user_id, comment_id).await
    }

    async fn count_votes(
        &self,
        comment_id: i64,
        vote_type: Option<VoteType>,
    ) -> anyhow::Result<i64> {
        Db::count_votes(self, comment_id, vote_type).await
    }

    async fn user_votes(
        &self,
        user_id: i64,
        comment_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, VoteType>> {
        Db::user_votes(self, user_id, comment_ids).await
    }

    async fn find_votes(
        &self,
        comment_id: i64,
        vote_type: Option<VoteType>,
        page: Pagination,
    ) -> anyhow::Result<(Vec<Vote>, i64)> {
        self.list_votes(comment_id, vote_type, page).await
    }

    async fn find_users(&self, ids: &[i64]) -> anyhow::Result<Vec<User>> {
        self.get_users(ids).await
    }
}
