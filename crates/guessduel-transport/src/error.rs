/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The peer sent more than the frame limit without a delimiter.
    #[error("frame exceeds {limit} bytes without a delimiter")]
    FrameTooLong { limit: usize },

    /// An outgoing payload contained the frame delimiter.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
