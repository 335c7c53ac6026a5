use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    contacts::repo_types::{Contact, NewContact},
    error::AppError,
    state::AppState,
};

/// No uniqueness or format checks on any field.
pub async fn add_contact(state: &AppState, owner: Uuid, new: NewContact<'_>) -> Result<Contact, AppError> {
    let contact = state.contacts.insert(owner, new).await?;
    info!(user_id = %owner, contact_id = %contact.id, "contact added");
    Ok(contact)
}

pub async fn list_contacts(state: &AppState, owner: Uuid) -> Result<Vec<Contact>, AppError> {
    Ok(state.contacts.list_by_owner(owner).await?)
}

pub async fn search_contact(
    state: &AppState,
    owner: Uuid,
    registration_number: &str,
) -> Result<Contact, AppError> {
    state
        .contacts
        .find_by_registration_number(owner, registration_number)
        .await?
        .ok_or(AppError::ContactNotFound)
}

/// Deleting someone else's (or a missing) contact is a silent no-op.
pub async fn delete_contact(state: &AppState, owner: Uuid, contact_id: Uuid) -> Result<(), AppError> {
    let removed = state.contacts.delete(owner, contact_id).await?;
    debug!(user_id = %owner, %contact_id, removed, "delete contact");
    Ok(())
}
