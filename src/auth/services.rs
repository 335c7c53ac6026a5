use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        claims::SessionClaims,
        password::{generate_reset_token, hash_password_blocking, verify_password_blocking},
        repo_types::{NewUser, User},
    },
    config::SessionConfig,
    error::AppError,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "session";

/// Lifetime of a password-reset token.
pub const RESET_TOKEN_TTL: TimeDuration = TimeDuration::hours(1);

/// Signing and verification keys for session cookies.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let SessionConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            cookie_secure,
        } = state.config.session.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes.max(1) as u64) * 60),
            cookie_secure,
        }
    }
}

impl SessionKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Adds a freshly signed session cookie for `user_id`.
    pub fn start_session(&self, jar: CookieJar, user_id: Uuid) -> anyhow::Result<CookieJar> {
        let token = self.sign(user_id)?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .build();
        Ok(jar.add(cookie))
    }
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    jar.remove(removal)
}

#[instrument(skip(state, password))]
pub async fn register(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    if state.users.find_by_username(username).await?.is_some() {
        return Err(AppError::DuplicateUsername);
    }
    if state.users.find_by_email(email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password_blocking(password).await?;
    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash: &password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Missing users and bad passwords are both reported as `InvalidCredentials`.
#[instrument(skip(state, password))]
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<User, AppError> {
    let Some(user) = state.users.find_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(password, &user.password_hash).await? {
        warn!(%username, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

/// Issues a reset token and mails a link under the configured `base_url`.
/// Returns `false` when the email is unknown.
#[instrument(skip(state))]
pub async fn forgot_password(state: &AppState, email: &str) -> Result<bool, AppError> {
    let Some(user) = state.users.find_by_email(email).await? else {
        return Ok(false);
    };

    let token = generate_reset_token();
    let expires_at = OffsetDateTime::now_utc() + RESET_TOKEN_TTL;
    state
        .users
        .set_reset_token(user.id, &token, expires_at)
        .await
        .context("store reset token")?;

    let link = format!("{}/reset-password/{}", state.config.base_url, token);
    let body = format!("Click the following link to reset your password: {link}");
    state
        .mailer
        .send(&user.email, "Password Reset Request", &body)
        .await?;

    info!(user_id = %user.id, "password reset issued");
    Ok(true)
}

#[instrument(skip(state, token, new_password))]
pub async fn reset_password(state: &AppState, token: &str, new_password: &str) -> Result<(), AppError> {
    let password_hash = hash_password_blocking(new_password).await?;
    let now = OffsetDateTime::now_utc();
    let Some(user_id) = state
        .users
        .consume_reset_token(token, now, &password_hash)
        .await?
    else {
        warn!("reset with invalid or expired token");
        return Err(AppError::InvalidOrExpiredToken);
    };

    info!(%user_id, "password reset");
    Ok(())
}
