use std::fmt;
use std::io;

use iccom_frame::FrameError;
use iccom_loopback::LoopbackError;
use iccom_socket::SocketError;
use iccom_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::PayloadTooLarge { .. } | FrameError::EmptyPayload => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ref other if other.is_validation() => {
            CliError::new(USAGE, format!("{context}: {other}"))
        }
        ref other if other.is_protocol() => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
        FrameError::ShortWrite { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn socket_error(context: &str, err: SocketError) -> CliError {
    match err {
        SocketError::Frame(err) => frame_error(context, err),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn loopback_error(context: &str, err: LoopbackError) -> CliError {
    match err {
        LoopbackError::Channel(err) => frame_error(context, err),
        LoopbackError::ReversedRange { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        LoopbackError::Io { source, .. } => io_error(context, source),
        LoopbackError::Parse(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        LoopbackError::NotActive => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use iccom_frame::ChannelArea;

    use super::*;

    #[test]
    fn frame_errors_map_to_exit_codes() {
        let invalid = FrameError::InvalidChannel {
            channel: 0x1_0000,
            area: ChannelArea::Any,
        };
        assert_eq!(frame_error("open", invalid).code, USAGE);
        assert_eq!(
            frame_error("send", FrameError::PayloadTooLarge { size: 5000, max: 4096 }).code,
            DATA_INVALID
        );
        assert_eq!(
            frame_error("recv", FrameError::Truncated { len: 3, min: 16 }).code,
            DATA_INVALID
        );
        let refused = FrameError::Transport(TransportError::Connect {
            target: "localhost:1".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        });
        assert_eq!(frame_error("open", refused).code, TRANSPORT_ERROR);
    }

    #[test]
    fn not_open_is_internal() {
        let err = socket_error("flush", SocketError::NotOpen { channel: 1 });
        assert_eq!(err.code, INTERNAL);
        assert!(err.message.starts_with("flush: "));
    }

    #[test]
    fn loopback_errors_map_to_exit_codes() {
        assert_eq!(
            loopback_error(
                "enable",
                LoopbackError::ReversedRange {
                    from_ch: 2,
                    to_ch: 1
                }
            )
            .code,
            USAGE
        );
        assert_eq!(
            loopback_error("status", LoopbackError::NotActive).code,
            FAILURE
        );
    }
}
