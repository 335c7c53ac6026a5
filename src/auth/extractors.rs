use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};
use uuid::Uuid;

use super::services::{end_session, SessionKeys, SESSION_COOKIE};
use crate::{
    flash::{self, Flash},
    state::AppState,
};

/// The logged-in user behind the session cookie.
///
/// Rejects with a redirect to `/login`, so protected handlers just take it as an argument.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Err(login_redirect(jar));
        };

        let keys = SessionKeys::from_ref(state);
        let claims = match keys.verify(&token) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "rejected session cookie");
                return Err(login_redirect(end_session(jar)));
            }
        };

        match state.users.find_by_id(claims.sub).await {
            Ok(Some(user)) => Ok(SessionUser {
                id: user.id,
                username: user.username,
            }),
            Ok(None) => Err(login_redirect(end_session(jar))),
            Err(e) => {
                error!(error = %e, user_id = %claims.sub, "load session user failed");
                Err(crate::error::AppError::Internal(e).into_response())
            }
        }
    }
}

fn login_redirect(jar: CookieJar) -> Response {
    (flash::set(jar, Flash::LoginRequired), Redirect::to("/login")).into_response()
}
