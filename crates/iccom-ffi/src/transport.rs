use std::ffi::CStr;
use std::os::raw::c_char;

use crate::error;

/// Convert an optional C string argument into UTF-8 `&str`. Null is `None`.
///
/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
pub(crate) unsafe fn optional_str_arg<'a>(
    value: *const c_char,
    name: &str,
) -> Result<Option<&'a str>, i32> {
    if value.is_null() {
        return Ok(None);
    }

    let as_cstr = {
        // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
        unsafe { CStr::from_ptr(value) }
    };

    match as_cstr.to_str() {
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(error::set_invalid_argument(format!(
            "{name} must be valid UTF-8"
        ))),
    }
}

/// Convert a byte pointer + length into a slice.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
pub(crate) unsafe fn bytes_arg<'a>(data: *const u8, len: usize, name: &str) -> Result<&'a [u8], i32> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(error::set_invalid_argument(format!(
            "{name} cannot be null when len > 0"
        )));
    }

    // SAFETY: Pointer and length are validated above and owned by caller for the call duration.
    Ok(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Convert a writable byte pointer + length into a mutable slice.
///
/// # Safety
/// `data` must be null or writable for `len` bytes and not aliased for the call duration.
pub(crate) unsafe fn bytes_arg_mut<'a>(
    data: *mut u8,
    len: usize,
    name: &str,
) -> Result<&'a mut [u8], i32> {
    if data.is_null() {
        return Err(error::set_invalid_argument(format!("{name} cannot be null")));
    }

    // SAFETY: Pointer is non-null and the caller guarantees `len` writable bytes.
    Ok(unsafe { std::slice::from_raw_parts_mut(data, len) })
}
