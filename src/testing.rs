//! In-memory repositories, a recording mailer and a cookie-keeping HTTP client for tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    config::{AppConfig, MailConfig, SessionConfig},
    contacts::{
        repo::ContactRepo,
        repo_types::{Contact, NewContact},
    },
    error::AppError,
    mail::Mailer,
    state::AppState,
};

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepo {
    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| pred(u)).cloned()
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut User)) {
        if let Some(u) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            f(u);
        }
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.find(|u| u.id == id))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.find(|u| u.email == email))
    }

    async fn create(&self, new: NewUser<'_>) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == new.username) {
            return Err(AppError::DuplicateUsername);
        }
        if users.iter().any(|u| u.email == new.email) {
            return Err(AppError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username.to_string(),
            email: new.email.to_string(),
            password_hash: new.password_hash.to_string(),
            reset_token: None,
            reset_token_expires_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        self.update(id, |u| {
            u.reset_token = Some(token.to_string());
            u.reset_token_expires_at = Some(expires_at);
        });
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
        password_hash: &str,
    ) -> anyhow::Result<Option<Uuid>> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| {
            u.reset_token.as_deref() == Some(token)
                && u.reset_token_expires_at.is_some_and(|exp| exp > now)
        }) else {
            return Ok(None);
        };
        user.password_hash = password_hash.to_string();
        user.reset_token = None;
        user.reset_token_expires_at = None;
        Ok(Some(user.id))
    }
}

#[derive(Default)]
pub struct MemoryContactRepo {
    contacts: Mutex<Vec<Contact>>,
}

#[async_trait]
impl ContactRepo for MemoryContactRepo {
    async fn insert(&self, owner: Uuid, new: NewContact<'_>) -> anyhow::Result<Contact> {
        let contact = Contact {
            id: Uuid::new_v4(),
            user_id: owner,
            mobile: new.mobile.to_string(),
            email: new.email.to_string(),
            address: new.address.to_string(),
            registration_number: new.registration_number.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.contacts.lock().unwrap().push(contact.clone());
        Ok(contact)
    }

    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Contact>> {
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_by_registration_number(
        &self,
        owner: Uuid,
        registration_number: &str,
    ) -> anyhow::Result<Option<Contact>> {
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == owner && c.registration_number == registration_number)
            .cloned())
    }

    async fn delete(&self, owner: Uuid, contact_id: Uuid) -> anyhow::Result<bool> {
        let mut contacts = self.contacts.lock().unwrap();
        let before = contacts.len();
        contacts.retain(|c| !(c.id == contact_id && c.user_id == owner));
        Ok(contacts.len() != before)
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        session: SessionConfig {
            secret: "test-secret".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 5,
            cookie_secure: false,
        },
        mail: MailConfig {
            server: "localhost".into(),
            port: 25,
            username: None,
            password: None,
            default_sender: "noreply@example.com".into(),
        },
        base_url: "http://portal.test".into(),
    }
}

pub fn memory_state() -> AppState {
    memory_state_with_mailer(RecordingMailer::default())
}

pub fn memory_state_with_mailer(mailer: RecordingMailer) -> AppState {
    AppState::from_parts(
        Arc::new(test_config()),
        Arc::new(MemoryUserRepo::default()),
        Arc::new(MemoryContactRepo::default()),
        Arc::new(mailer),
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Drives the real router and keeps cookies between requests, like a browser.
pub struct TestClient {
    app: Router,
    host: String,
    cookies: BTreeMap<String, String>,
}

impl TestClient {
    pub fn new(state: AppState) -> Self {
        Self {
            app: crate::app::build_app(state),
            host: "portal.test".into(),
            cookies: BTreeMap::new(),
        }
    }

    /// Overrides the `Host` header sent with every request.
    pub fn set_host(&mut self, host: &str) {
        self.host = host.to_string();
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let req = self.request("GET", path).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let req = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, self.host.as_str());
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| Cookie::new(k.as_str(), v.as_str()).stripped().to_string())
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let res = self.app.clone().oneshot(req).await.unwrap();

        for raw in res.headers().get_all(header::SET_COOKIE) {
            let cookie = Cookie::parse(raw.to_str().unwrap()).unwrap();
            let removal = cookie.value().is_empty()
                || cookie.max_age() == Some(time::Duration::ZERO);
            if removal {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
