use std::path::PathBuf;

use iccom_frame::FrameError;

/// Errors that can occur while driving the loopback control surface.
#[derive(Debug, thiserror::Error)]
pub enum LoopbackError {
    /// A rule endpoint is not a prime channel.
    #[error("invalid loopback endpoint: {0}")]
    Channel(#[from] FrameError),

    /// The rule's range is reversed.
    #[error("from_ch {from_ch} is greater than to_ch {to_ch}")]
    ReversedRange { from_ch: u32, to_ch: u32 },

    /// Reading or writing the control file failed.
    #[error("loopback control {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The control file holds something that is not a rule.
    #[error("malformed loopback state {0:?}")]
    Parse(String),

    /// No rule is currently active.
    #[error("loopback is not active")]
    NotActive,
}

impl LoopbackError {
    /// Bad rule arguments, detected before touching the control file.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoopbackError::Channel(_) | LoopbackError::ReversedRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LoopbackError>;
