use chrono::Utc;
use domain::query::{resolve_filter, resolve_order, COMMENT_FIELDS};
use domain::{
    Comment, CommentCriteria, CommentRelationships, FilterMap, FilterValue, ListParams,
    NewComment, OrderBy, Paginated, ResourceType, VoteType, Voter,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::role::Viewer;
use crate::store::CommentStore;

#[derive(Debug, Clone, Copy)]
pub struct CommentLimits {
    pub default_per_page: u32,
    pub max_per_page: u32,
    pub max_content_length: usize,
}

impl Default for CommentLimits {
    fn default() -> Self {
        Self {
            default_per_page: 15,
            max_per_page: 100,
            max_content_length: 1000,
        }
    }
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
    limits: CommentLimits,
}

// 查询参数中的值必须能转换成对应列的类型，否则丢弃
fn accepts_filter_value(key: &str, value: &str) -> bool {
    match key {
        "comment_id" | "user_id" | "resource_id" => value.trim().parse::<i64>().is_ok(),
        "resource_type" => value.parse::<ResourceType>().is_ok(),
        _ => true,
    }
}

fn criteria_from_filter(filter: &FilterMap) -> CommentCriteria {
    let int = |key: &str| filter.get(key).and_then(FilterValue::as_i64);

    CommentCriteria {
        comment_id: int("comment_id"),
        user_id: int("user_id"),
        resource_type: filter
            .get("resource_type")
            .and_then(FilterValue::as_text)
            .and_then(|s| s.parse().ok()),
        resource_id: int("resource_id"),
        is_deleted: filter
            .get("is_deleted")
            .and_then(FilterValue::as_bool)
            .unwrap_or(false),
    }
}

fn parse_vote_type(raw: &str) -> Result<VoteType> {
    raw.trim()
        .parse()
        .map_err(|e: domain::UnknownVariant| Error::validation(e.to_string()))
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>, limits: CommentLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> CommentLimits {
        self.limits
    }

    // filter 为调用方固定的条件，params 中白名单内的过滤条件可以覆盖它
    pub async fn get_list(
        &self,
        filter: FilterMap,
        params: &ListParams,
        viewer: &Viewer,
        include_vote_info: bool,
    ) -> Result<Paginated<Comment>> {
        let raw = params.filters.iter().filter_map(|(k, v)| {
            if accepts_filter_value(k, v) {
                Some((k.as_str(), v.as_str()))
            } else {
                debug!("Dropping filter {}={} with unparsable value", k, v);
                None
            }
        });
        let filter = resolve_filter(raw, COMMENT_FIELDS.filter, filter);
        let criteria = criteria_from_filter(&filter);

        let default_order = if criteria.is_deleted {
            vec![OrderBy::desc("deleted_at")]
        } else {
            vec![OrderBy::desc("created_at")]
        };
        let order = resolve_order(params.order.as_deref(), COMMENT_FIELDS.order, default_order);
        let page = params.pagination(self.limits.default_per_page, self.limits.max_per_page);

        let (mut comments, total) = self.store.find(&criteria, &order, page).await?;
        if include_vote_info {
            self.attach_vote_info(&mut comments, viewer).await?;
        }

        Ok(Paginated {
            data: comments,
            pagination: page.meta(total),
        })
    }

    // 已删除的评论只有管理员可见
    pub async fn get(
        &self,
        id: i64,
        viewer: &Viewer,
        include_vote_info: bool,
    ) -> Result<Option<Comment>> {
        let comment = match self.store.find_one(id).await? {
            Some(c) if !c.is_deleted || viewer.is_manager() => c,
            _ => return Ok(None),
        };

        let mut comments = vec![comment];
        if include_vote_info {
            self.attach_vote_info(&mut comments, viewer).await?;
        }
        Ok(comments.pop())
    }

    pub async fn get_or_fail(
        &self,
        id: i64,
        viewer: &Viewer,
        include_vote_info: bool,
    ) -> Result<Comment> {
        self.get(id, viewer, include_vote_info)
            .await?
            .ok_or_else(|| Error::comment_not_found(id))
    }

    pub async fn create(
        &self,
        user_id: i64,
        resource_type: ResourceType,
        resource_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let content = self.validate_content(content)?;
        let id = self
            .store
            .insert(&NewComment {
                user_id,
                resource_type,
                resource_id,
                content,
                created_at: Utc::now().naive_utc(),
            })
            .await?;

        info!(
            "Comment {} created by user {} on {} {}",
            id, user_id, resource_type, resource_id
        );
        self.store
            .find_one(id)
            .await?
            .ok_or_else(|| Error::comment_not_found(id))
    }

    // 作者 id，不区分是否已删除，用于权限判断
    pub async fn author_of(&self, id: i64) -> Result<i64> {
        self.store
            .find_one(id)
            .await?
            .map(|c| c.user_id)
            .ok_or_else(|| Error::comment_not_found(id))
    }

    pub async fn update(&self, id: i64, content: &str) -> Result<()> {
        self.live_or_fail(id).await?;
        let content = self.validate_content(content)?;

        let affected = self
            .store
            .update_content(id, &content, Utc::now().naive_utc())
            .await?;
        if affected == 0 {
            return Err(Error::comment_not_found(id));
        }

        info!("Comment {} updated", id);
        Ok(())
    }

    // 软删除；重复删除不报错
    pub async fn delete(&self, id: i64) -> Result<()> {
        let comment = self
            .store
            .find_one(id)
            .await?
            .ok_or_else(|| Error::comment_not_found(id))?;
        if comment.is_deleted {
            return Ok(());
        }

        self.store
            .set_deleted(&[id], true, Utc::now().naive_utc())
            .await?;
        info!("Comment {} moved to trash", id);
        Ok(())
    }

    pub async fn delete_multiple(&self, ids: &[i64]) -> Result<()> {
        let affected = self
            .store
            .set_deleted(ids, true, Utc::now().naive_utc())
            .await?;
        info!("Moved {} of {} comments to trash", affected, ids.len());
        Ok(())
    }

    pub async fn restore(&self, id: i64) -> Result<()> {
        let comment = self
            .store
            .find_one(id)
            .await?
            .ok_or_else(|| Error::comment_not_found(id))?;
        if !comment.is_deleted {
            return Ok(());
        }

        self.store
            .set_deleted(&[id], false, Utc::now().naive_utc())
            .await?;
        info!("Comment {} restored", id);
        Ok(())
    }

    pub async fn restore_multiple(&self, ids: &[i64]) -> Result<()> {
        let affected = self
            .store
            .set_deleted(ids, false, Utc::now().naive_utc())
            .await?;
        info!("Restored {} of {} comments", affected, ids.len());
        Ok(())
    }

    // 彻底删除，不可恢复
    pub async fn destroy(&self, id: i64) -> Result<()> {
        if self.store.destroy(&[id]).await? == 0 {
            return Err(Error::comment_not_found(id));
        }
        info!("Comment {} destroyed", id);
        Ok(())
    }

    pub async fn destroy_multiple(&self, ids: &[i64]) -> Result<()> {
        let affected = self.store.destroy(ids).await?;
        info!("Destroyed {} of {} comments", affected, ids.len());
        Ok(())
    }

    // vote_type 为空时返回全部类型
    pub async fn get_voters(
        &self,
        comment_id: i64,
        vote_type: Option<&str>,
        params: &ListParams,
        include_user_info: bool,
    ) -> Result<Paginated<Voter>> {
        let vote_type = match vote_type.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_vote_type(raw)?),
            _ => None,
        };
        self.live_or_fail(comment_id).await?;

        let page = params.pagination(self.limits.default_per_page, self.limits.max_per_page);
        let (votes, total) = self.store.find_votes(comment_id, vote_type, page).await?;

        let users = if include_user_info {
            let ids: Vec<i64> = votes.iter().map(|v| v.user_id).collect();
            self.store
                .find_users(&ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        } else {
            HashMap::new()
        };

        let voters = votes
            .into_iter()
            .map(|v| Voter {
                user_id: v.user_id,
                vote_type: v.vote_type,
                voted_at: v.created_at,
                user: users.get(&v.user_id).cloned(),
            })
            .collect();

        Ok(Paginated {
            data: voters,
            pagination: page.meta(total),
        })
    }

    pub async fn add_vote(&self, user_id: i64, comment_id: i64, vote_type: &str) -> Result<()> {
        let vote_type = parse_vote_type(vote_type)?;
        self.live_or_fail(comment_id).await?;

        self.store
            .insert_or_update_vote(user_id, comment_id, vote_type, Utc::now().naive_utc())
            .await?;
        info!("User {} voted {} on {}", user_id, vote_type, comment_id);
        Ok(())
    }

    pub async fn delete_vote(&self, user_id: i64, comment_id: i64) -> Result<()> {
        if self.store.delete_vote(user_id, comment_id).await? > 0 {
            info!("User {} removed vote on comment {}", user_id, comment_id);
        }
        Ok(())
    }

    pub async fn get_vote_count(&self, comment_id: i64) -> Result<i64> {
        Ok(self.store.count_votes(comment_id, None).await?)
    }

    async fn live_or_fail(&self, id: i64) -> Result<Comment> {
        match self.store.find_one(id).await? {
            Some(c) if !c.is_deleted => Ok(c),
            _ => Err(Error::comment_not_found(id)),
        }
    }

    fn validate_content(&self, content: &str) -> Result<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::validation("content cannot be empty"));
        }
        if content.chars().count() > self.limits.max_content_length {
            return Err(Error::validation(format!(
                "content cannot exceed {} characters",
                self.limits.max_content_length
            )));
        }
        Ok(content.to_string())
    }

    async fn attach_vote_info(&self, comments: &mut [Comment], viewer: &Viewer) -> Result<()> {
        let votes = match viewer.user_id() {
            Some(user_id) => {
                let ids: Vec<i64> = comments.iter().map(|c| c.id).collect();
                self.store.user_votes(user_id, &ids).await?
            }
            None => HashMap::new(),
        };

        for comment in comments.iter_mut() {
            comment.relationships = Some(CommentRelationships {
                voting: votes.get(&comment.id).copied(),
            });
        }
        Ok(())
    }
}
