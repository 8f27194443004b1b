use iccom_frame as frame;
use iccom_transport::IccomStream;

use crate::error;
use crate::transport;
use crate::types::{ConnHandle, IccomHandle};

fn with_conn_mut<T>(
    handle: IccomHandle,
    on_error: impl FnOnce(i32) -> T,
    f: impl FnOnce(&mut IccomStream) -> T,
) -> T {
    if handle.is_null() {
        return on_error(error::set_invalid_argument("handle cannot be null"));
    }

    let conn_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut ConnHandle) }
    };

    f(&mut conn_handle.conn)
}

fn frame_result(result: frame::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => error::map_frame_error(&err),
    }
}

fn length_result(result: frame::Result<usize>) -> i32 {
    match result {
        Ok(len) => i32::try_from(len).unwrap_or(i32::MAX),
        Err(err) => error::map_frame_error(&err),
    }
}

/// Open a connection for `channel` with the current configuration.
///
/// Returns 0 and stores the handle in `out_handle`, or a negated errno.
///
/// # Safety
/// `out_handle` must be a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn iccom_open(channel: u32, out_handle: *mut IccomHandle) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();

        if out_handle.is_null() {
            return error::set_invalid_argument("out_handle cannot be null");
        }

        let config = crate::config::current();
        match frame::open(&config.binding, channel) {
            Ok(conn) => {
                let handle = ConnHandle { conn, channel };
                // SAFETY: Pointer was checked for null above.
                unsafe {
                    *out_handle = Box::into_raw(Box::new(handle)) as IccomHandle;
                }
                0
            }
            Err(err) => error::map_frame_error(&err),
        }
    })
}

/// Close a connection and free its handle. Null is ignored.
///
/// # Safety
/// `handle` must be null or a handle returned by `iccom_open` that was not
/// closed before.
#[no_mangle]
pub unsafe extern "C" fn iccom_close(handle: IccomHandle) {
    crate::ffi_boundary((), || {
        if handle.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by iccom_open.
        let conn_handle = unsafe { Box::from_raw(handle as *mut ConnHandle) };
        frame::close(conn_handle.conn);
    });
}

/// Channel the handle was opened for, or a negated errno.
///
/// # Safety
/// `handle` must be a valid handle returned by `iccom_open`.
#[no_mangle]
pub unsafe extern "C" fn iccom_channel(handle: IccomHandle) -> i64 {
    crate::ffi_boundary(-i64::from(libc::EFAULT), || {
        if handle.is_null() {
            return i64::from(error::set_invalid_argument("handle cannot be null"));
        }
        // SAFETY: Pointer validity is guaranteed by the caller.
        let conn_handle = unsafe { &*(handle as *const ConnHandle) };
        i64::from(conn_handle.channel)
    })
}

/// Set the read timeout in milliseconds; 0 blocks indefinitely.
///
/// # Safety
/// `handle` must be a valid handle returned by `iccom_open`.
#[no_mangle]
pub unsafe extern "C" fn iccom_set_socket_read_timeout(handle: IccomHandle, ms: i64) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();
        with_conn_mut(handle, |code| code, |conn| {
            frame_result(frame::set_read_timeout(conn, ms))
        })
    })
}

/// Read timeout in milliseconds (0 = blocking), or a negated errno.
///
/// # Safety
/// `handle` must be a valid handle returned by `iccom_open`.
#[no_mangle]
pub unsafe extern "C" fn iccom_get_socket_read_timeout(handle: IccomHandle) -> i64 {
    crate::ffi_boundary(-i64::from(libc::EFAULT), || {
        error::clear_error_state();
        with_conn_mut(handle, i64::from, |conn| {
            match frame::read_timeout(conn) {
                Ok(ms) => i64::try_from(ms).unwrap_or(i64::MAX),
                Err(err) => i64::from(error::map_frame_error(&err)),
            }
        })
    })
}

/// Send `data_size` bytes from `data` as one frame.
///
/// # Safety
/// `handle` must be a valid handle. If `data_size > 0`, `data` must be
/// readable for that many bytes.
#[no_mangle]
pub unsafe extern "C" fn iccom_send_data(
    handle: IccomHandle,
    data: *const u8,
    data_size: usize,
) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();

        // SAFETY: We validate pointer/length pairing in helper.
        let payload = match unsafe { transport::bytes_arg(data, data_size, "data") } {
            Ok(v) => v,
            Err(code) => return code,
        };

        with_conn_mut(handle, |code| code, |conn| {
            frame_result(frame::send_copy(conn, payload))
        })
    })
}

/// Send a frame whose payload already sits at `data_offset` in `buf`.
///
/// # Safety
/// `handle` must be a valid handle. `buf` must be null or writable for
/// `buf_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn iccom_send_data_nocopy(
    handle: IccomHandle,
    buf: *mut u8,
    buf_size: usize,
    data_offset: usize,
    data_size: usize,
) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();

        // SAFETY: We validate null in helper; the caller guarantees the length.
        let buf = match unsafe { transport::bytes_arg_mut(buf, buf_size, "buf") } {
            Ok(v) => v,
            Err(code) => return code,
        };

        with_conn_mut(handle, |code| code, |conn| {
            frame_result(frame::send_nocopy(conn, buf, data_offset, data_size))
        })
    })
}

/// Receive one frame into `buf` leaving the payload in place.
///
/// Returns the payload size and stores the payload offset in
/// `data_offset_out`; 0 on timeout or closed peer; or a negated errno.
///
/// # Safety
/// `handle` must be a valid handle. `buf` must be null or writable for
/// `buf_size` bytes. `data_offset_out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn iccom_receive_data_nocopy(
    handle: IccomHandle,
    buf: *mut u8,
    buf_size: usize,
    data_offset_out: *mut usize,
) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();

        if data_offset_out.is_null() {
            return error::set_invalid_argument("data_offset_out cannot be null");
        }
        // SAFETY: We validate null in helper; the caller guarantees the length.
        let buf = match unsafe { transport::bytes_arg_mut(buf, buf_size, "buf") } {
            Ok(v) => v,
            Err(code) => return code,
        };

        with_conn_mut(handle, |code| code, |conn| {
            // SAFETY: Pointer was checked for null above.
            let offset = unsafe { &mut *data_offset_out };
            length_result(frame::receive_nocopy(conn, buf, offset))
        })
    })
}

/// Receive one frame and move its payload to the start of `buf`.
///
/// `buf` must hold a whole frame, see `iccom_get_required_buffer_size`.
/// Returns the payload size, 0 on timeout or closed peer, or a negated errno.
///
/// # Safety
/// `handle` must be a valid handle. `buf` must be null or writable for
/// `buf_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn iccom_receive_data(
    handle: IccomHandle,
    buf: *mut u8,
    buf_size: usize,
) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();

        // SAFETY: We validate null in helper; the caller guarantees the length.
        let buf = match unsafe { transport::bytes_arg_mut(buf, buf_size, "buf") } {
            Ok(v) => v,
            Err(code) => return code,
        };

        with_conn_mut(handle, |code| code, |conn| {
            let mut offset = 0usize;
            let result = frame::receive_nocopy(conn, buf, &mut offset).map(|len| {
                if len > 0 {
                    buf.copy_within(offset..offset + len, 0);
                }
                len
            });
            length_result(result)
        })
    })
}
