//! Persistent key-value storage holding the bearer token.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::ClientError;

/// Key under which the bearer token is kept.
pub const TOKEN_KEY: &str = "token";

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn token(&self) -> Result<Option<String>, ClientError>;
    async fn set_token(&self, token: &str) -> Result<(), ClientError>;
}

/// JSON object on disk; other keys written by other tools are preserved.
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, ClientError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(ClientError::TokenStoreIo {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|source| ClientError::TokenStoreFormat {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn token(&self) -> Result<Option<String>, ClientError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToOwned::to_owned))
    }

    async fn set_token(&self, token: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().await;
        let io_err = |source| ClientError::TokenStoreIo {
            path: self.path.clone(),
            source,
        };

        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.trim().to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(&Value::Object(entries)).map_err(|source| {
            ClientError::TokenStoreFormat {
                path: self.path.clone(),
                source,
            }
        })?;
        tokio::fs::write(&self.path, body).await.map_err(io_err)
    }
}

/// In-memory store, used when the token is supplied directly.
#[derive(Default)]
pub struct StaticTokenStore {
    token: Mutex<Option<String>>,
}

impl StaticTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }
}

#[async_trait]
impl TokenStore for StaticTokenStore {
    async fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.token.lock().await.clone())
    }

    async fn set_token(&self, token: &str) -> Result<(), ClientError> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }
}
