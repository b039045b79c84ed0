use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{CreateError, Created, FetchError, UserService};
use crate::config::RosterConfig;
use crate::core::draft::NewUser;
use crate::core::user::{Snapshot, User, UserId};

/// Standard response wrapper used by the users service.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: Option<String>,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    users: Vec<User>,
}

/// HTTP client for the users service REST API.
#[derive(Debug, Clone)]
pub struct UsersClient {
    base_url: String,
    http: Client,
}

impl UsersClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(FetchError::Unconfigured);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            http,
        })
    }

    pub fn from_config(config: &RosterConfig) -> Result<Self, FetchError> {
        Self::new(&config.service_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn user_url(&self, id: &UserId) -> String {
        format!("{}/users/{}", self.base_url, id)
    }

    fn ping_url(&self) -> String {
        format!("{}/users/ping", self.base_url)
    }
}

impl UserService for UsersClient {
    async fn fetch_all(&self) -> Result<Snapshot, FetchError> {
        let url = self.users_url();
        log::debug!("GET {}", url);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        let snapshot = users_response(status, &body)
            .inspect_err(|e| log::warn!("GET {} failed: {}", url, e))?;
        log::debug!("Fetched {} users", snapshot.len());
        Ok(snapshot)
    }

    async fn create(&self, user: &NewUser) -> Result<Created, CreateError> {
        let url = self.users_url();
        log::debug!("POST {} ({})", url, user.email);

        let resp = self.http.post(&url).json(user).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        created_response(status, &body).inspect_err(|e| log::warn!("POST {} failed: {}", url, e))
    }

    async fn fetch_one(&self, id: &UserId) -> Result<User, FetchError> {
        let url = self.user_url(id);
        log::debug!("GET {}", url);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        user_response(id, status, &body)
    }

    async fn ping(&self) -> Result<String, FetchError> {
        let resp = self.http.get(self.ping_url()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        ping_response(status, &body)
    }
}

/// `GET /users`: any non-2xx status is an error carrying the service's message.
pub(crate) fn users_response(status: StatusCode, body: &str) -> Result<Snapshot, FetchError> {
    ensure_success(status, body)?;
    parse_users(body)
}

/// `GET /users/{id}`: 404 means the service has no such user.
pub(crate) fn user_response(id: &UserId, status: StatusCode, body: &str) -> Result<User, FetchError> {
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound(id.clone()));
    }
    ensure_success(status, body)?;
    parse_user(body)
}

/// `POST /users`: the service answers 400 for bad payloads and duplicate emails.
pub(crate) fn created_response(status: StatusCode, body: &str) -> Result<Created, CreateError> {
    if !status.is_success() {
        return Err(CreateError::Rejected {
            status,
            message: failure_message(status, body),
        });
    }
    parse_created(body)
}

pub(crate) fn ping_response(status: StatusCode, body: &str) -> Result<String, FetchError> {
    ensure_success(status, body)?;
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(body)?;
    Ok(envelope.message.unwrap_or_else(|| "ok".to_string()))
}

fn ensure_success(status: StatusCode, body: &str) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            status,
            message: failure_message(status, body),
        })
    }
}

/// Parse the `GET /users` body: `{"status": ..., "data": {"users": [...]}}`.
pub(crate) fn parse_users(body: &str) -> Result<Snapshot, FetchError> {
    let envelope: Envelope<UsersData> = serde_json::from_str(body)?;
    match envelope.data {
        Some(data) => Ok(Snapshot::new(data.users)),
        // A 200 without a list is a failure; the previous snapshot must survive it.
        None => Err(FetchError::Status {
            status: StatusCode::OK,
            message: envelope.message.unwrap_or_else(|| {
                format!(
                    "response carried no users (status: {})",
                    envelope.status.as_deref().unwrap_or("missing")
                )
            }),
        }),
    }
}

/// Parse the `GET /users/{id}` body: `{"status": ..., "data": {id, username, email, active}}`.
pub(crate) fn parse_user(body: &str) -> Result<User, FetchError> {
    let envelope: Envelope<User> = serde_json::from_str(body)?;
    match envelope.data {
        Some(user) => Ok(user),
        None => Err(FetchError::Status {
            status: StatusCode::OK,
            message: envelope
                .message
                .unwrap_or_else(|| "response carried no user".to_string()),
        }),
    }
}

/// Parse a successful `POST /users` body.
///
/// Accepts the record under `data`, a bare record, or an acknowledgement
/// envelope with only a `message`.
pub(crate) fn parse_created(body: &str) -> Result<Created, CreateError> {
    if body.trim().is_empty() {
        return Ok(Created::Acknowledged {
            message: String::new(),
        });
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    let serde_json::Value::Object(mut map) = value else {
        return Ok(Created::Acknowledged {
            message: String::new(),
        });
    };

    if let Some(data) = map.remove("data") {
        return Ok(Created::User(serde_json::from_value(data)?));
    }
    if map.contains_key("id") {
        return Ok(Created::User(serde_json::from_value(
            serde_json::Value::Object(map),
        )?));
    }

    let message = map
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(Created::Acknowledged { message })
}

/// Human-readable reason for a failed request: the service's `message` if the
/// body is a fail envelope, otherwise the start of the raw body or the status text.
pub(crate) fn failure_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        if let Some(message) = envelope.message.filter(|m| !m.is_empty()) {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
