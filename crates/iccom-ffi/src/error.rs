use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use iccom_frame::FrameError;
use iccom_loopback::LoopbackError;
use iccom_transport::TransportError;

use crate::types::{EBADE, ENODATA};

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

/// Record `message` and return `-EINVAL`.
pub(crate) fn set_invalid_argument(message: impl Into<String>) -> i32 {
    set_error_message(message);
    -libc::EINVAL
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

/// Record `err` and return its negated errno.
pub(crate) fn map_frame_error(err: &FrameError) -> i32 {
    set_error_message(err.to_string());
    -frame_errno(err)
}

pub(crate) fn map_loopback_error(err: &LoopbackError) -> i32 {
    set_error_message(err.to_string());
    let errno = match err {
        LoopbackError::Channel(inner) => frame_errno(inner),
        LoopbackError::ReversedRange { .. } => libc::EINVAL,
        LoopbackError::Io { source, .. } => source.raw_os_error().unwrap_or(libc::EIO),
        LoopbackError::Parse(_) => EBADE,
        LoopbackError::NotActive => ENODATA,
    };
    -errno
}

fn frame_errno(err: &FrameError) -> i32 {
    match err {
        FrameError::InvalidChannel { .. }
        | FrameError::BufferSizeMismatch { .. }
        | FrameError::DataOffsetMismatch { .. }
        | FrameError::EmptyPayload
        | FrameError::InvalidTimeout(_) => libc::EINVAL,
        FrameError::PayloadTooLarge { .. } => libc::E2BIG,
        FrameError::BufferTooSmall { .. } => libc::ENFILE,
        FrameError::Transport(inner) => transport_errno(inner),
        FrameError::ShortWrite { .. } => libc::EPIPE,
        FrameError::Truncated { .. } | FrameError::LengthMismatch { .. } => EBADE,
        FrameError::UnexpectedOffset { .. } => libc::EFAULT,
    }
}

fn transport_errno(err: &TransportError) -> i32 {
    match err {
        TransportError::Resolve { .. } => libc::EINVAL,
        TransportError::Unsupported(_) => libc::EOPNOTSUPP,
        other => other.raw_os_error().unwrap_or(libc::EPIPE),
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
