//! Typed HTTP client for the admin API: five operations per entity, no
//! retries, no caching. Non-2xx responses surface as `ClientError::Api` with
//! the status and decoded body.

mod bookings;
mod cars;
mod companies;
mod users;
pub mod edit;

pub use edit::{EditController, EditState, Editable};

use crate::error::FieldError;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Network-level failure: connect, timeout, decode.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("api error: status {status}")]
    Api { status: u16, body: Value },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(_) => None,
        }
    }

    /// Field-level details from a validation reject, if the body carries any.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let ClientError::Api { body, .. } = self else {
            return Vec::new();
        };
        body.pointer("/error/details")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        Some(FieldError::new(
                            item.get("field")?.as_str()?,
                            item.get("message")?.as_str()?,
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Human-readable message for error panels.
    pub fn message(&self) -> String {
        if let ClientError::Api { body, .. } = self {
            for pointer in ["/error/message", "/message"] {
                if let Some(msg) = body.pointer(pointer).and_then(Value::as_str) {
                    return msg.to_string();
                }
            }
        }
        self.to_string()
    }
}

/// Session claims forwarded on every request, matching the server's
/// header-based session provider.
#[derive(Clone, Debug)]
pub struct AuthHeaders {
    pub user_id: String,
    pub tenant_id: String,
    pub roles: Vec<String>,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    auth: AuthHeaders,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: AuthHeaders) -> Self {
        ApiClient {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            auth,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-User-Id", &self.auth.user_id)
            .header("X-Tenant-Id", &self.auth.tenant_id)
            .header("X-Roles", self.auth.roles.join(","))
    }

    pub(crate) fn get(&self, path: &str, pairs: Vec<(&'static str, String)>) -> RequestBuilder {
        let req = self.request(Method::GET, path);
        if pairs.is_empty() {
            req
        } else {
            req.query(&pairs)
        }
    }

    pub(crate) fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> RequestBuilder {
        self.request(Method::POST, path).json(body)
    }

    pub(crate) fn put_json<B: serde::Serialize>(&self, path: &str, body: &B) -> RequestBuilder {
        self.request(Method::PUT, path).json(body)
    }

    pub(crate) fn delete_req(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    pub(crate) async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
