use crate::{models::SqlVote, Db};
use chrono::NaiveDateTime;
use domain::{Pagination, Vote, VoteType};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::HashMap;

impl Db {
    // (user_id, comment_id) 主键保证每人每条评论最多一票，重复投票只更新类型
    pub async fn upsert_vote(
        &self,
        user_id: i64,
        comment_id: i64,
        vote_type: VoteType,
        now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO votes (user_id, comment_id, type, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, comment_id) DO UPDATE SET
                type = excluded.type,
                created_at = excluded.created_at
            "#,
        )
        .bind(user_id)
        .bind(comment_id)
        .bind(vote_type.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_vote(&self, user_id: i64, comment_id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM votes WHERE user_id = ? AND comment_id = ?")
            .bind(user_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_votes(
        &self,
        comment_id: i64,
        vote_type: Option<VoteType>,
    ) -> anyhow::Result<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM votes WHERE comment_id = ");
        qb.push_bind(comment_id);
        if let Some(t) = vote_type {
            qb.push(" AND type = ").push_bind(t.as_str());
        }

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // 当前用户在给定评论上的投票，用于列表附加投票状态
    pub async fn user_votes(
        &self,
        user_id: i64,
        comment_ids: &[i64],
    ) -> anyhow::Result<HashMap<i64, VoteType>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb =
            QueryBuilder::<Sqlite>::new("SELECT comment_id, type FROM votes WHERE user_id = ");
        qb.push_bind(user_id).push(" AND comment_id IN (");
        let mut separated = qb.separated(", ");
        for id in comment_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = qb
            .build_query_as::<(i64, String)>()
            .fetch_all(&self.pool)
            .await?;

        let mut votes = HashMap::with_capacity(rows.len());
        for (comment_id, t) in rows {
            votes.insert(comment_id, t.parse::<VoteType>()?);
        }
        Ok(votes)
    }

    pub async fn list_votes(
        &self,
        comment_id: i64,
        vote_type: Option<VoteType>,
        page: Pagination,
    ) -> anyhow::Result<(Vec<Vote>, i64)> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT user_id, comment_id, type AS vote_type, created_at FROM votes WHERE comment_id = ",
        );
        qb.push_bind(comment_id);
        if let Some(t) = vote_type {
            qb.push(" AND type = ").push_bind(t.as_str());
        }
        qb.push(" ORDER BY created_at DESC, user_id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb
            .build_query_as::<SqlVote>()
            .fetch_all(&self.pool)
            .await?;

        let total = self.count_votes(comment_id, vote_type).await?;
        let votes = rows
            .into_iter()
            .map(Vote::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((votes, total))
    }
}
