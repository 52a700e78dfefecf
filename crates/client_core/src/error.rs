use std::path::PathBuf;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend rejected request with HTTP {status}: {error}")]
    Api {
        status: u16,
        #[source]
        error: ApiError,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    #[error("failed to access token store '{}': {source}", path.display())]
    TokenStoreIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("token store '{}' is not a JSON object: {source}", path.display())]
    TokenStoreFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn api_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { error, .. } => Some(error.code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.api_code(),
            Some(ErrorCode::Unauthorized | ErrorCode::Forbidden)
        )
    }
}
