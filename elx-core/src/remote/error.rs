//! Remote call error types.

/// Errors that can occur while talking to the content server.
#[derive(Debug)]
pub enum RemoteError {
    /// Request could not be sent or the connection failed
    Http(String),
    /// Server answered with a non-success status
    Status { status: u16, message: String },
    /// Response body was not the expected JSON
    Decode(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Http(e) => write!(f, "HTTP error: {}", e),
            RemoteError::Status { status, message } => {
                write!(f, "Server returned status {}: {}", status, message)
            }
            RemoteError::Decode(e) => write!(f, "Invalid server response: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {}
