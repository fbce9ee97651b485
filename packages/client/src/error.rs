//! Error types for the Jubensha client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not open the WebSocket
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The connection closed before a reply arrived
    #[error("Connection closed")]
    Closed,

    /// No reply within the request timeout
    #[error("Request '{0}' timed out")]
    Timeout(String),

    /// The server answered with an error reply
    #[error("{0}")]
    Server(String),

    /// A reply did not have the expected shape
    #[error("Unexpected reply to '{kind}': {source}")]
    UnexpectedReply {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}
