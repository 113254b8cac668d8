use thiserror::Error;

/// A shared error type for the whole client.
///
/// Every operation returns one of these variants; nothing is recovered
/// internally except the auth polling loop, which treats "not yet
/// activated" as retryable.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-success HTTP status from the API or a presigned endpoint.
    #[error("HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The request never produced a response (connection, TLS, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-empty `errors` list.
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    /// The login handshake was rejected or never completed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Caller-supplied arguments are malformed.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// A response did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// File system failure while streaming uploads or downloads.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
