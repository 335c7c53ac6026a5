use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::error::AppError;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, reset_token, reset_token_expires_at, created_at";

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Inserts a user. Unique violations surface as `DuplicateUsername` / `DuplicateEmail`.
    async fn create(&self, new: NewUser<'_>) -> Result<User, AppError>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()>;

    /// Swaps in `password_hash` and clears the token in one step, provided the token
    /// expires strictly after `now`. Returns the affected user, at most once per token.
    async fn consume_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
        password_hash: &str,
    ) -> anyhow::Result<Option<Uuid>>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("users_username_key") => return AppError::DuplicateUsername,
                Some("users_email_key") => return AppError::DuplicateEmail,
                _ => {}
            }
        }
    }
    AppError::Internal(e.into())
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.find_one("email", email).await
    }

    async fn create(&self, new: NewUser<'_>) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.username)
            .bind(new.email)
            .bind(new.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(map_unique_violation)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET reset_token = $2, reset_token_expires_at = $3
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
        password_hash: &str,
    ) -> anyhow::Result<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE users
               SET password_hash = $3, reset_token = NULL, reset_token_expires_at = NULL
             WHERE reset_token = $1 AND reset_token_expires_at > $2
            RETURNING id
            "#,
        )
        .bind(token)
        .bind(now)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await?;
        Ok(id)
    }
}

/// Runs against a real database only when `DATABASE_URL` is set.
#[cfg(test)]
mod tests {
    use super::*;

    async fn pg_repo() -> Option<PgUserRepo> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to DATABASE_URL");
        crate::db::migrate(&db).await.expect("migrations");
        Some(PgUserRepo::new(db))
    }

    #[tokio::test]
    async fn unique_constraints_map_to_duplicate_errors() {
        let Some(repo) = pg_repo().await else {
            return;
        };
        let tag = Uuid::new_v4().simple().to_string();
        let username = format!("user-{tag}");
        let email = format!("{tag}@example.com");
        let other_username = format!("other-{tag}");
        let other_email = format!("other-{tag}@example.com");

        repo.create(NewUser { username: &username, email: &email, password_hash: "h" })
            .await
            .unwrap();

        let err = repo
            .create(NewUser { username: &username, email: &other_email, password_hash: "h" })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername), "got {err:?}");

        let err = repo
            .create(NewUser { username: &other_username, email: &email, password_hash: "h" })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail), "got {err:?}");
    }

    #[tokio::test]
    async fn reset_token_is_consumed_once() {
        let Some(repo) = pg_repo().await else {
            return;
        };
        let tag = Uuid::new_v4().simple().to_string();
        let user = repo
            .create(NewUser {
                username: &format!("reset-{tag}"),
                email: &format!("reset-{tag}@example.com"),
                password_hash: "old",
            })
            .await
            .unwrap();
        let now = OffsetDateTime::now_utc();
        repo.set_reset_token(user.id, &tag, now + time::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(repo.consume_reset_token(&tag, now, "new").await.unwrap(), Some(user.id));
        assert_eq!(repo.consume_reset_token(&tag, now, "newer").await.unwrap(), None);

        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new");
        assert!(stored.reset_token.is_none());
    }
}
