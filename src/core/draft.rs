use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Column width of the service's username and email fields.
pub const MAX_FIELD_LEN: usize = 128;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Username,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a username is required")]
    EmptyUsername,
    #[error("usernames are limited to {} characters", MAX_FIELD_LEN)]
    UsernameTooLong,
    #[error("{0:?} is not a valid email address")]
    InvalidEmail(String),
    #[error("email addresses are limited to {} characters", MAX_FIELD_LEN)]
    EmailTooLong,
}

/// Form input for a user that has not been submitted yet.
///
/// Fields hold exactly what was typed; trimming only happens in [`Draft::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub username: String,
    pub email: String,
}

/// A validated create request, serialized as the POST body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl Draft {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.email.is_empty()
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Username => &self.username,
            DraftField::Email => &self.email,
        }
    }

    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Username => self.username = value,
            DraftField::Email => self.email = value,
        }
    }

    pub fn clear(&mut self) {
        self.username.clear();
        self.email.clear();
    }

    pub fn validate(&self) -> Result<NewUser, ValidationError> {
        let username = self.username.trim();
        let email = self.email.trim();

        if username.is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        if username.chars().count() > MAX_FIELD_LEN {
            return Err(ValidationError::UsernameTooLong);
        }
        if email.chars().count() > MAX_FIELD_LEN {
            return Err(ValidationError::EmailTooLong);
        }
        if !is_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }

        Ok(NewUser {
            username: username.to_string(),
            email: email.to_string(),
        })
    }
}

pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}
