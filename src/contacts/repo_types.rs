use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub user_id: Uuid, // owner
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub registration_number: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct NewContact<'a> {
    pub mobile: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub registration_number: &'a str,
}
