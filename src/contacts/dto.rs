use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddContactForm {
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub registration_number: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchContactForm {
    pub registration_number: String,
}
