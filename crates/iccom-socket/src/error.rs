use iccom_frame::FrameError;

/// Errors that can occur in channel socket operations.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// Framing, validation or transport failure underneath the socket.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The operation needs an open socket.
    #[error("socket for channel {channel} is not open")]
    NotOpen { channel: u32 },
}

impl SocketError {
    /// The underlying frame error, if any.
    pub fn frame(&self) -> Option<&FrameError> {
        match self {
            SocketError::Frame(err) => Some(err),
            SocketError::NotOpen { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SocketError>;
