use crate::{models::SqlUser, Db};
use chrono::{NaiveDateTime, Utc};
use domain::User;
use sha2::{Digest, Sha256};
use sqlx::{QueryBuilder, Sqlite};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub headline: Option<String>,
    pub is_manager: bool,
}

// 令牌只以摘要形式落库
fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl Db {
    pub async fn insert_user(&self, u: &NewUser) -> anyhow::Result<i64> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, avatar, headline, is_manager, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&u.username)
        .bind(&u.email)
        .bind(&u.avatar)
        .bind(&u.headline)
        .bind(u.is_manager)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_users(&self, ids: &[i64]) -> anyhow::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, username, avatar, headline, is_manager, created_at FROM users WHERE id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = qb
            .build_query_as::<SqlUser>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn insert_token(
        &self,
        token: &str,
        user_id: i64,
        expires_at: NaiveDateTime,
    ) -> anyhow::Result<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO tokens (token_hash, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(token_hash) DO UPDATE SET
                user_id = excluded.user_id,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(token_digest(token))
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // 过期令牌视为不存在
    pub async fn find_user_by_token(&self, token: &str) -> anyhow::Result<Option<User>> {
        let now = Utc::now().naive_utc();

        let row = sqlx::query_as::<_, SqlUser>(
            r#"
            SELECT u.id, u.username, u.avatar, u.headline, u.is_manager, u.created_at
            FROM tokens t
            JOIN users u ON t.user_id = u.id
            WHERE t.token_hash = ? AND t.expires_at > ?
            "#,
        )
        .bind(token_digest(token))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_db;
    use chrono::Duration;

    fn user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: Some(format!("{}@example.com", name)),
            avatar: None,
            headline: None,
            is_manager: false,
        }
    }

    #[tokio::test]
    async fn token_lookup_respects_expiry() {
        let db = test_db().await;
        let id = db.insert_user(&user("ferris")).await.unwrap();
        let now = Utc::now().naive_utc();

        db.insert_token("live", id, now + Duration::hours(1)).await.unwrap();
        db.insert_token("stale", id, now - Duration::hours(1)).await.unwrap();

        let found = db.find_user_by_token("live").await.unwrap().unwrap();
        assert_eq!(found.username, "ferris");
        assert!(db.find_user_by_token("stale").await.unwrap().is_none());
        assert!(db.find_user_by_token("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_users_skips_unknown_ids() {
        let db = test_db().await;
        let a = db.insert_user(&user("a")).await.unwrap();
        let b = db.insert_user(&user("b")).await.unwrap();

        let users = db.get_users(&[a, b, 404]).await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(db.get_users(&[]).await.unwrap().is_empty());
    }
}
