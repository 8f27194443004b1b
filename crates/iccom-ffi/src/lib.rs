//! iccom-ffi: C-ABI exports for iccom channel connections and loopback
//! control.
//!
//! Functions return 0 or a non-negative count on success and a negated
//! errno on failure. The message behind the last failure on the calling
//! thread is available from `iccom_last_error`.

mod config;
mod conn;
mod error;
mod layout;
mod loopback;
mod transport;
mod types;

#[cfg(test)]
mod test_support;

use std::panic::AssertUnwindSafe;

pub use config::{iccom_configure, iccom_reset_config};
pub use conn::{
    iccom_channel, iccom_close, iccom_get_socket_read_timeout, iccom_open, iccom_receive_data,
    iccom_receive_data_nocopy, iccom_send_data, iccom_send_data_nocopy,
    iccom_set_socket_read_timeout,
};
pub use layout::{
    iccom_channel_verify, iccom_get_data_payload_offset, iccom_get_max_payload_size,
    iccom_get_required_buffer_size, iccom_lun_cid_to_channel,
};
pub use loopback::{
    iccom_loopback_disable, iccom_loopback_enable, iccom_loopback_get, iccom_loopback_is_active,
};
pub use types::{IccomHandle, IccomLoopbackCfg};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn iccom_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
