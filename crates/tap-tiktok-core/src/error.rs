use thiserror::Error;

use crate::http_client::HttpError;

/// Errors surfaced while configuring or running a stream.
#[derive(Debug, Error)]
pub enum TapError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown stream '{0}'")]
    UnknownStream(String),

    #[error("http transport error: {0}")]
    Http(#[from] HttpError),

    #[error("{url} returned status {status}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response is missing pagination field '{field}'")]
    Pagination { field: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl TapError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
