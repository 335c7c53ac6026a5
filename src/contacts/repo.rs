use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::contacts::repo_types::{Contact, NewContact};

/// Every query is scoped to `owner`.
#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn insert(&self, owner: Uuid, new: NewContact<'_>) -> anyhow::Result<Contact>;
    /// Insertion order.
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Contact>>;
    async fn find_by_registration_number(
        &self,
        owner: Uuid,
        registration_number: &str,
    ) -> anyhow::Result<Option<Contact>>;
    /// Returns whether a row was removed.
    async fn delete(&self, owner: Uuid, contact_id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgContactRepo {
    db: PgPool,
}

impl PgContactRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepo for PgContactRepo {
    async fn insert(&self, owner: Uuid, new: NewContact<'_>) -> anyhow::Result<Contact> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, user_id, mobile, email, address, registration_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, mobile, email, address, registration_number, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(new.mobile)
        .bind(new.email)
        .bind(new.address)
        .bind(new.registration_number)
        .fetch_one(&self.db)
        .await?;
        Ok(contact)
    }

    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, mobile, email, address, registration_number, created_at
              FROM contacts
             WHERE user_id = $1
             ORDER BY seq ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_registration_number(
        &self,
        owner: Uuid,
        registration_number: &str,
    ) -> anyhow::Result<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, mobile, email, address, registration_number, created_at
              FROM contacts
             WHERE user_id = $1 AND registration_number = $2
             ORDER BY seq ASC
             LIMIT 1
            "#,
        )
        .bind(owner)
        .bind(registration_number)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, contact_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(contact_id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
