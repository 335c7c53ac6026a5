use anyhow::Context;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_sender: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub mail: MailConfig,
    /// Public origin used in emailed links, without a trailing slash.
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| var(key).with_context(|| format!("{key} must be set"));

        let database_url = required("DATABASE_URL")?;
        let session = SessionConfig {
            secret: required("SECRET_KEY")?,
            issuer: var("SESSION_ISSUER").unwrap_or_else(|| "contact-portal".into()),
            audience: var("SESSION_AUDIENCE").unwrap_or_else(|| "contact-portal-users".into()),
            ttl_minutes: var("SESSION_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
            cookie_secure: var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        let mail = MailConfig {
            server: var("MAIL_SERVER").unwrap_or_else(|| "smtp.gmail.com".into()),
            port: var("MAIL_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
            username: var("MAIL_USERNAME").filter(|v| !v.is_empty()),
            password: var("MAIL_PASSWORD").filter(|v| !v.is_empty()),
            default_sender: required("MAIL_DEFAULT_SENDER")?,
        };
        let base_url = required("APP_BASE_URL")?.trim_end_matches('/').to_string();
        anyhow::ensure!(!base_url.is_empty(), "APP_BASE_URL must not be empty");

        Ok(Self {
            database_url,
            session,
            mail,
            base_url,
        })
    }
}
