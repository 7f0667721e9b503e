use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// 评论挂载的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Question,
    Answer,
    Article,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Question => "question",
            ResourceType::Answer => "answer",
            ResourceType::Article => "article",
        }
    }
}

impl FromStr for ResourceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(ResourceType::Question),
            "answer" => Ok(ResourceType::Answer),
            "article" => Ok(ResourceType::Article),
            other => Err(UnknownVariant {
                kind: "resource type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Up => "up",
            VoteType::Down => "down",
        }
    }
}

impl FromStr for VoteType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteType::Up),
            "down" => Ok(VoteType::Down),
            other => Err(UnknownVariant {
                kind: "vote type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRelationships {
    // 当前用户自己的投票
    pub voting: Option<VoteType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub resource_type: ResourceType,
    pub resource_id: i64,
    // 以下计数均为查询时实时统计
    pub vote_count: i64,
    pub vote_up_count: i64,
    pub vote_down_count: i64,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<CommentRelationships>,
}

// 列表查询条件，is_deleted 总是生效
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentCriteria {
    pub comment_id: Option<i64>,
    pub user_id: Option<i64>,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<i64>,
    pub is_deleted: bool,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: i64,
    pub resource_type: ResourceType,
    pub resource_id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: i64,
    pub comment_id: i64,
    #[serde(rename = "type")]
    pub vote_type: VoteType,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub avatar: Option<String>,
    pub headline: Option<String>,
    pub is_manager: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub vote_type: VoteType,
    pub voted_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}
