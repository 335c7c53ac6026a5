use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::contacts::repo::{ContactRepo, PgContactRepo};
use crate::mail::{Mailer, SmtpMailer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub contacts: Arc<dyn ContactRepo>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Postgres-backed repositories and the SMTP relay.
    pub fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let mailer = Arc::new(SmtpMailer::new(&config.mail)?) as Arc<dyn Mailer>;
        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(PgUserRepo::new(db.clone())),
            Arc::new(PgContactRepo::new(db)),
            mailer,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        contacts: Arc<dyn ContactRepo>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            users,
            contacts,
            mailer,
        }
    }
}
