use axum::{
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm},
        extractors::SessionUser,
        services::{self, end_session, SessionKeys},
    },
    error::AppError,
    flash::{self, Flash},
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/forgot-password", get(forgot_password_page).post(forgot_password))
        .route("/reset-password/:token", get(reset_password_page).post(reset_password))
}

/// Redirect target for a flash-carrying domain error, or the error itself.
fn flash_redirect(jar: CookieJar, err: AppError, to: &str) -> Result<Response, AppError> {
    match err.flash() {
        Some(f) => Ok((flash::set(jar, f), Redirect::to(to)).into_response()),
        None => Err(err),
    }
}

pub async fn index(user: Option<SessionUser>) -> Redirect {
    match user {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}

pub async fn register_page(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, views::register_page(flash))
}

#[instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match services::register(&state, &form.username, &form.email, &form.password).await {
        Ok(_) => Ok((flash::set(jar, Flash::Registered), Redirect::to("/login")).into_response()),
        Err(e) => flash_redirect(jar, e, "/register"),
    }
}

pub async fn login_page(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, views::login_page(flash))
}

/// Failed logins re-render the form instead of redirecting.
#[instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match services::login(&state, &form.username, &form.password).await {
        Ok(user) => {
            let keys = SessionKeys::from_ref(&state);
            let jar = keys.start_session(jar, user.id)?;
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(AppError::InvalidCredentials) => {
            Ok(views::login_page(Some(Flash::InvalidCredentials)).into_response())
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip(jar), fields(user_id = %user.id))]
pub async fn logout(user: SessionUser, jar: CookieJar) -> (CookieJar, Redirect) {
    info!("user logged out");
    (end_session(jar), Redirect::to("/login"))
}

pub async fn forgot_password_page(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, views::forgot_password_page(flash))
}

#[instrument(skip(state, jar, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response, AppError> {
    let outcome = if services::forgot_password(&state, &form.email).await? {
        Flash::ResetEmailSent
    } else {
        Flash::EmailNotFound
    };
    Ok((flash::set(jar, outcome), Redirect::to("/forgot-password")).into_response())
}

pub async fn reset_password_page(
    Path(token): Path<String>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, views::reset_password_page(&token, flash))
}

#[instrument(skip(state, token, jar, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    jar: CookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    match services::reset_password(&state, &token, &form.password).await {
        Ok(()) => Ok((flash::set(jar, Flash::PasswordReset), Redirect::to("/login")).into_response()),
        Err(e) => flash_redirect(jar, e, &format!("/reset-password/{token}")),
    }
}
