//! Upstash REST implementation of the `KeyValueStore` trait.
//!
//! Each Redis command is sent as `POST {endpoint}` with a JSON array body
//! (`["LPUSH", "key", "value"]`) and a bearer token. Replies are either
//! `{"result": ...}` or `{"error": "..."}`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use marginalia_core::error::DomainError;
use marginalia_core::store::KeyValueStore;

/// Errors raised while talking to the REST endpoint.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the command.
    #[error("{command} failed: {message}")]
    Command {
        /// Redis command name.
        command: String,
        /// Error text returned by the server.
        message: String,
    },

    /// The server answered with something that is not a protocol reply.
    #[error("{command} returned unexpected reply (status {status}): {body}")]
    UnexpectedReply {
        /// Redis command name.
        command: String,
        /// HTTP status of the reply.
        status: StatusCode,
        /// Raw body, for diagnostics.
        body: String,
    },
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::Infrastructure(err.to_string())
    }
}

// `Failure` is listed first so an `{"error": ...}` body is never read as a
// successful `null` result.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Failure { error: String },
    Success { result: T },
}

/// Key-value store client for the Upstash REST API.
#[derive(Debug, Clone)]
pub struct UpstashStore {
    client: Client,
    endpoint: Url,
    token: String,
}

impl UpstashStore {
    /// Creates a client for `endpoint`, authenticating with `token`.
    #[must_use]
    pub fn new(endpoint: Url, token: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            token,
        }
    }

    /// Sends one command and decodes its `result`.
    async fn execute<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, StoreError> {
        let command = args.first().copied().unwrap_or_default().to_owned();
        tracing::debug!(%command, "sending store command");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Reply<T>>(&body) {
            Ok(Reply::Success { result }) if status.is_success() => Ok(result),
            Ok(Reply::Failure { error }) => Err(StoreError::Command {
                command,
                message: error,
            }),
            Ok(Reply::Success { .. }) | Err(_) => Err(StoreError::UnexpectedReply {
                command,
                status,
                body,
            }),
        }
    }
}

#[async_trait]
impl KeyValueStore for UpstashStore {
    async fn incr(&self, key: &str) -> Result<i64, DomainError> {
        Ok(self.execute(&["INCR", key]).await?)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64, DomainError> {
        Ok(self.execute(&["LPUSH", key, value]).await?)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, DomainError> {
        let start = start.to_string();
        let stop = stop.to_string();
        Ok(self.execute(&["LRANGE", key, &start, &stop]).await?)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, DomainError> {
        Ok(self.execute(&["HGET", key, field]).await?)
    }
}
