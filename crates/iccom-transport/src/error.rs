/// Errors that can occur in ICCom transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The target address could not be resolved.
    #[error("failed to resolve {target}: {source}")]
    Resolve {
        target: String,
        source: std::io::Error,
    },

    /// No connection could be established to the target.
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on an established connection.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The binding is not available on this platform.
    #[error("{0} binding is not supported on this platform")]
    Unsupported(&'static str),
}

impl TransportError {
    /// The OS error code behind this failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            TransportError::Resolve { source, .. }
            | TransportError::Connect { source, .. }
            | TransportError::Io(source) => source.raw_os_error(),
            TransportError::Unsupported(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
