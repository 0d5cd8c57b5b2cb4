use thiserror::Error;

/// Failures talking to the document server.
///
/// `Display` gives the detail shown to the user after the `"Error: "` prefix.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No HTTP response was received.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-ok status.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// The response body wasn't the JSON we expected.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ClientError {
    fn from(err: tokio::task::JoinError) -> Self {
        ClientError::Transport(format!("request task failed: {}", err))
    }
}
