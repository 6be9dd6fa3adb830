use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("command execution failed: {0}")]
    Command(#[from] io::Error),

    #[error("{program} exited with status {status}: {stderr}")]
    Gpg {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("invalid fingerprint '{fingerprint}': {reason}")]
    InvalidFingerprint { fingerprint: String, reason: String },

    #[error("key not found in local keyring: {0}")]
    KeyNotFound(String),

    #[error("keyring not initialized")]
    KeyringNotInitialized,

    #[error("permission denied while accessing the keyring")]
    PermissionDenied,

    #[error("failed to capture stdin of the keyring tool")]
    StdinCaptureFailed,

    #[error("Invalid keylist_filename: {}", .0.display())]
    KeylistNotFound(PathBuf),

    #[error("Not a valid JSON file: {0}")]
    InvalidJson(String),

    #[error("Not a valid keylist")]
    InvalidKeylist,

    #[error("key not found on keyserver")]
    NotFound,

    #[error("unexpected HTTP status {0}")]
    HttpStatus(hyper::StatusCode),

    #[error("malformed response from server: {0}")]
    MalformedResponse(String),

    #[error("service reported an error: {0}")]
    Service(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid URI: {0}")]
    Uri(#[from] hyper::http::uri::InvalidUri),

    #[error("failed to build HTTP request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] hyper::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
