use iccom_transport::TransportError;

use crate::channel::ChannelArea;

/// Errors that can occur while framing, sending or receiving ICCom messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The channel number lies outside the requested area.
    #[error("channel {channel} is out of the {area} channel range")]
    InvalidChannel { channel: u32, area: ChannelArea },

    /// The send buffer is not sized for its payload.
    #[error("buffer size {actual} does not match required size {expected} for {payload} payload bytes")]
    BufferSizeMismatch {
        actual: usize,
        expected: usize,
        payload: usize,
    },

    /// The payload does not start at the fixed payload offset.
    #[error("payload offset {actual} does not match expected offset {expected}")]
    DataOffsetMismatch { actual: usize, expected: usize },

    /// The payload exceeds the maximum message size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// There is no payload to send.
    #[error("payload is empty, nothing to send")]
    EmptyPayload,

    /// A negative read timeout was requested.
    #[error("invalid read timeout {0}ms (must be >= 0)")]
    InvalidTimeout(i64),

    /// The receive buffer cannot hold even an empty frame.
    #[error("receive buffer of {size} bytes is too small (must exceed {min})")]
    BufferTooSmall { size: usize, min: usize },

    /// The underlying connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The connection accepted only part of a frame.
    #[error("message truncated on send ({written} of {expected} bytes written)")]
    ShortWrite { written: usize, expected: usize },

    /// Fewer bytes arrived than a frame header needs.
    #[error("truncated frame received ({len} bytes, header needs {min})")]
    Truncated { len: usize, min: usize },

    /// The header's declared length disagrees with the bytes actually read.
    #[error("declared frame length {declared} needs {expected} bytes but {actual} were read")]
    LengthMismatch {
        declared: usize,
        expected: usize,
        actual: usize,
    },

    /// A received payload was reported at an offset the layout does not allow.
    #[error("received payload at offset {actual}, expected {expected}")]
    UnexpectedOffset { actual: usize, expected: usize },
}

impl FrameError {
    /// Bad arguments, detected locally before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidChannel { .. }
                | FrameError::BufferSizeMismatch { .. }
                | FrameError::DataOffsetMismatch { .. }
                | FrameError::PayloadTooLarge { .. }
                | FrameError::EmptyPayload
                | FrameError::InvalidTimeout(_)
                | FrameError::BufferTooSmall { .. }
        )
    }

    /// Malformed data; the offending frame has been dropped.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            FrameError::Truncated { .. }
                | FrameError::LengthMismatch { .. }
                | FrameError::UnexpectedOffset { .. }
        )
    }

    /// The connection itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, FrameError::Transport(_) | FrameError::ShortWrite { .. })
    }
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::Transport(TransportError::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
