use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "flash";

/// One-shot messages shown on the next rendered page.
///
/// Only the code travels in the cookie, so the value never needs escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
    UsernameTaken,
    EmailTaken,
    InvalidCredentials,
    LoginRequired,
    ResetEmailSent,
    EmailNotFound,
    PasswordReset,
    InvalidOrExpiredToken,
    ContactAdded,
    ContactNotFound,
    ContactDeleted,
}

const ALL: [Flash; 12] = [
    Flash::Registered,
    Flash::UsernameTaken,
    Flash::EmailTaken,
    Flash::InvalidCredentials,
    Flash::LoginRequired,
    Flash::ResetEmailSent,
    Flash::EmailNotFound,
    Flash::PasswordReset,
    Flash::InvalidOrExpiredToken,
    Flash::ContactAdded,
    Flash::ContactNotFound,
    Flash::ContactDeleted,
];

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::Registered => "registered",
            Flash::UsernameTaken => "username_taken",
            Flash::EmailTaken => "email_taken",
            Flash::InvalidCredentials => "invalid_credentials",
            Flash::LoginRequired => "login_required",
            Flash::ResetEmailSent => "reset_email_sent",
            Flash::EmailNotFound => "email_not_found",
            Flash::PasswordReset => "password_reset",
            Flash::InvalidOrExpiredToken => "invalid_token",
            Flash::ContactAdded => "contact_added",
            Flash::ContactNotFound => "contact_not_found",
            Flash::ContactDeleted => "contact_deleted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::Registered => "Registration successful. Please log in.",
            Flash::UsernameTaken => "Username already exists",
            Flash::EmailTaken => "Email already exists",
            Flash::InvalidCredentials => "Invalid username or password",
            Flash::LoginRequired => "Please log in to access this page.",
            Flash::ResetEmailSent => "Password reset email sent",
            Flash::EmailNotFound => "Email not found",
            Flash::PasswordReset => "Password reset successful. Please log in.",
            Flash::InvalidOrExpiredToken => "Invalid or expired token",
            Flash::ContactAdded => "Contact added successfully",
            Flash::ContactNotFound => "Contact not found",
            Flash::ContactDeleted => "Contact deleted successfully",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            Flash::UsernameTaken
                | Flash::EmailTaken
                | Flash::InvalidCredentials
                | Flash::LoginRequired
                | Flash::EmailNotFound
                | Flash::InvalidOrExpiredToken
                | Flash::ContactNotFound
        )
    }

    /// CSS category, mirrors the `success` / `error` split.
    pub fn category(self) -> &'static str {
        if self.is_error() {
            "error"
        } else {
            "success"
        }
    }
}

pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, flash.code()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Reads the pending flash and schedules the cookie for removal.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(code) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let mut removal = Cookie::from(FLASH_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), Flash::from_code(&code))
}
