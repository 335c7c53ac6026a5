use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::dto::{AddContactForm, SearchContactForm};
use super::repo_types::NewContact;
use super::services::{add_contact, delete_contact, list_contacts, search_contact};
use crate::{
    auth::extractors::SessionUser,
    error::AppError,
    flash::{self, Flash},
    state::AppState,
    views,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/add-contact", post(add))
        .route("/search-contact", post(search))
        .route("/delete-contact/:contact_id", post(delete))
}

#[instrument(skip(state, jar), fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let contacts = list_contacts(&state, user.id).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, views::dashboard_page(&user.username, &contacts, None, flash)))
}

#[instrument(skip(state, jar, form), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
    Form(form): Form<AddContactForm>,
) -> Result<Response, AppError> {
    add_contact(
        &state,
        user.id,
        NewContact {
            mobile: &form.mobile,
            email: &form.email,
            address: &form.address,
            registration_number: &form.registration_number,
        },
    )
    .await?;
    Ok((flash::set(jar, Flash::ContactAdded), Redirect::to("/dashboard")).into_response())
}

#[instrument(skip(state, jar, form), fields(user_id = %user.id))]
pub async fn search(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
    Form(form): Form<SearchContactForm>,
) -> Result<Response, AppError> {
    match search_contact(&state, user.id, &form.registration_number).await {
        Ok(hit) => {
            let (jar, flash) = flash::take(jar);
            let page = views::dashboard_page(
                &user.username,
                std::slice::from_ref(&hit),
                Some(&hit),
                flash,
            );
            Ok((jar, page).into_response())
        }
        Err(AppError::ContactNotFound) => Ok((
            flash::set(jar, Flash::ContactNotFound),
            Redirect::to("/dashboard"),
        )
            .into_response()),
        Err(e) => Err(e),
    }
}

/// A malformed id is treated like any other id that matches nothing.
#[instrument(skip(state, jar), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    user: SessionUser,
    jar: CookieJar,
    Path(contact_id): Path<String>,
) -> Result<Response, AppError> {
    match contact_id.parse::<Uuid>() {
        Ok(id) => delete_contact(&state, user.id, id).await?,
        Err(_) => debug!(%contact_id, "delete with malformed contact id"),
    }
    Ok((flash::set(jar, Flash::ContactDeleted), Redirect::to("/dashboard")).into_response())
}
