use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network failure or a non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The exchange rejected the request signature or key.
    #[error("Authentication rejected: {0}")]
    Auth(String),

    /// The response did not have the expected shape or values.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
