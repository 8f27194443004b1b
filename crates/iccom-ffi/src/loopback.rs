use crate::config;
use crate::error;
use crate::types::IccomLoopbackCfg;

/// Bridge channels `[from_ch, to_ch]` to the same range shifted by
/// `range_shift`. Both ends must be prime channels.
#[no_mangle]
pub extern "C" fn iccom_loopback_enable(from_ch: u32, to_ch: u32, range_shift: i32) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();
        match config::current().loopback().enable(from_ch, to_ch, range_shift) {
            Ok(()) => 0,
            Err(err) => error::map_loopback_error(&err),
        }
    })
}

#[no_mangle]
pub extern "C" fn iccom_loopback_disable() -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();
        match config::current().loopback().disable() {
            Ok(()) => 0,
            Err(err) => error::map_loopback_error(&err),
        }
    })
}

/// 1 if a loopback rule is active, 0 otherwise (including when the control
/// cannot be read).
#[no_mangle]
pub extern "C" fn iccom_loopback_is_active() -> i32 {
    crate::ffi_boundary(0, || i32::from(config::current().loopback().is_active()))
}

/// Read the active rule into `out`.
///
/// # Safety
/// `out` must be null or a writable `IccomLoopbackCfg`.
#[no_mangle]
pub unsafe extern "C" fn iccom_loopback_get(out: *mut IccomLoopbackCfg) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();

        if out.is_null() {
            return error::set_invalid_argument("out cannot be null");
        }

        match config::current().loopback().get() {
            Ok(rule) => {
                // SAFETY: Pointer was checked for null above.
                unsafe {
                    *out = IccomLoopbackCfg {
                        from_ch: rule.from_ch,
                        to_ch: rule.to_ch,
                        range_shift: rule.range_shift,
                    };
                }
                0
            }
            Err(err) => error::map_loopback_error(&err),
        }
    })
}
