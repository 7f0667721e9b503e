use crate::{models::SqlComment, Db};
use chrono::NaiveDateTime;
use domain::query::Direction;
use domain::{Comment, CommentCriteria, NewComment, OrderBy, Pagination};
use sqlx::{QueryBuilder, Sqlite};

const SELECT_COMMENTS: &str = r#"
    SELECT
        c.id,
        c.user_id,
        c.resource_type,
        c.resource_id,
        c.content,
        c.is_deleted,
        c.created_at,
        c.updated_at,
        c.deleted_at,
        (SELECT COUNT(*) FROM votes v WHERE v.comment_id = c.id) AS vote_count,
        (SELECT COUNT(*) FROM votes v WHERE v.comment_id = c.id AND v.type = 'up') AS vote_up_count,
        (SELECT COUNT(*) FROM votes v WHERE v.comment_id = c.id AND v.type = 'down') AS vote_down_count
    FROM comments c
"#;

fn push_criteria(qb: &mut QueryBuilder<'_, Sqlite>, criteria: &CommentCriteria) {
    qb.push(" WHERE c.is_deleted = ").push_bind(criteria.is_deleted);
    if let Some(id) = criteria.comment_id {
        qb.push(" AND c.id = ").push_bind(id);
    }
    if let Some(user_id) = criteria.user_id {
        qb.push(" AND c.user_id = ").push_bind(user_id);
    }
    if let Some(resource_type) = criteria.resource_type {
        qb.push(" AND c.resource_type = ")
            .push_bind(resource_type.as_str());
    }
    if let Some(resource_id) = criteria.resource_id {
        qb.push(" AND c.resource_id = ").push_bind(resource_id);
    }
}

// 排序字段只能来自固定的列映射，绝不拼接外部输入
fn order_column(field: &str) -> Option<&'static str> {
    match field {
        "created_at" => Some("c.created_at"),
        "updated_at" => Some("c.updated_at"),
        "deleted_at" => Some("c.deleted_at"),
        "vote_count" => Some("vote_count"),
        _ => None,
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Sqlite>, order: &[OrderBy]) {
    let mut tie_break = "ASC";
    let mut first = true;
    qb.push(" ORDER BY ");
    for o in order {
        let Some(column) = order_column(&o.field) else {
            continue;
        };
        let direction = match o.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        if first {
            tie_break = direction;
        } else {
            qb.push(", ");
        }
        qb.push(column).push(" ").push(direction);
        first = false;
    }
    if !first {
        qb.push(", ");
    }
    qb.push("c.id ").push(tie_break);
}

fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    qb.push(" (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

impl Db {
    pub async fn insert_comment(&self, c: &NewComment) -> anyhow::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (
                user_id, resource_type, resource_id, content,
                is_deleted, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, FALSE, ?, ?)
            "#,
        )
        .bind(c.user_id)
        .bind(c.resource_type.as_str())
        .bind(c.resource_id)
        .bind(&c.content)
        .bind(c.created_at)
        .bind(c.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    // 不区分是否已删除
    pub async fn get_comment(&self, id: i64) -> anyhow::Result<Option<Comment>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_COMMENTS);
        qb.push(" WHERE c.id = ").push_bind(id);

        let row = qb
            .build_query_as::<SqlComment>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(Comment::try_from).transpose()
    }

    pub async fn list_comments(
        &self,
        criteria: &CommentCriteria,
        order: &[OrderBy],
        page: Pagination,
    ) -> anyhow::Result<(Vec<Comment>, i64)> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_COMMENTS);
        push_criteria(&mut qb, criteria);
        push_order(&mut qb, order);
        qb.push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb
            .build_query_as::<SqlComment>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM comments c");
        push_criteria(&mut count, criteria);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let comments = rows
            .into_iter()
            .map(Comment::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((comments, total))
    }

    // 只有未删除的评论可以编辑
    pub async fn update_comment_content(
        &self,
        id: i64,
        content: &str,
        now: NaiveDateTime,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET content = ?, updated_at = ?
            WHERE id = ? AND is_deleted = FALSE
            "#,
        )
        .bind(content)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // 软删除 / 恢复，只改动状态确实变化的行
    pub async fn set_comments_deleted(
        &self,
        ids: &[i64],
        deleted: bool,
        now: NaiveDateTime,
    ) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let deleted_at = deleted.then_some(now);
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE comments SET is_deleted = ");
        qb.push_bind(deleted)
            .push(", deleted_at = ")
            .push_bind(deleted_at)
            .push(" WHERE is_deleted = ")
            .push_bind(!deleted)
            .push(" AND id IN");
        push_id_list(&mut qb, ids);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    // 彻底删除评论及其投票
    pub async fn destroy_comments(&self, ids: &[i64]) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let mut votes = QueryBuilder::<Sqlite>::new("DELETE FROM votes WHERE comment_id IN");
        push_id_list(&mut votes, ids);
        votes.build().execute(&mut *tx).await?;

        let mut comments = QueryBuilder::<Sqlite>::new("DELETE FROM comments WHERE id IN");
        push_id_list(&mut comments, ids);
        let result = comments.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
