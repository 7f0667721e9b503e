use chrono::NaiveDateTime;
use domain::{Comment, User, Vote};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub user_id: i64,
    pub resource_type: String,
    pub resource_id: i64,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,

    // 子查询统计字段 (来自 votes 表)
    pub vote_count: i64,
    pub vote_up_count: i64,
    pub vote_down_count: i64,
}

impl TryFrom<SqlComment> for Comment {
    type Error = anyhow::Error;

    fn try_from(sql: SqlComment) -> anyhow::Result<Self> {
        Ok(Comment {
            id: sql.id,
            content: sql.content,
            user_id: sql.user_id,
            resource_type: sql.resource_type.parse()?,
            resource_id: sql.resource_id,
            vote_count: sql.vote_count,
            vote_up_count: sql.vote_up_count,
            vote_down_count: sql.vote_down_count,
            is_deleted: sql.is_deleted,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
            deleted_at: sql.deleted_at,
            relationships: None,
        })
    }
}

#[derive(FromRow)]
pub struct SqlVote {
    pub user_id: i64,
    pub comment_id: i64,
    pub vote_type: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<SqlVote> for Vote {
    type Error = anyhow::Error;

    fn try_from(sql: SqlVote) -> anyhow::Result<Self> {
        Ok(Vote {
            user_id: sql.user_id,
            comment_id: sql.comment_id,
            vote_type: sql.vote_type.parse()?,
            created_at: sql.created_at,
        })
    }
}

// email 属于隐私字段，不读取
#[derive(FromRow)]
pub struct SqlUser {
    pub id: i64,
    pub username: String,
    pub avatar: Option<String>,
    pub headline: Option<String>,
    pub is_manager: bool,
    pub created_at: NaiveDateTime,
}

impl From<SqlUser> for User {
    fn from(sql: SqlUser) -> Self {
        User {
            id: sql.id,
            username: sql.username,
            avatar: sql.avatar,
            headline: sql.headline,
            is_manager: sql.is_manager,
            created_at: sql.created_at,
        }
    }
}
