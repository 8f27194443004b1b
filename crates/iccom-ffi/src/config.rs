use std::os::raw::c_char;
use std::sync::RwLock;

use iccom_socket::IccomConfig;
use iccom_transport::Binding;

use crate::error;
use crate::transport;

static CONFIG: RwLock<Option<IccomConfig>> = RwLock::new(None);

/// The configuration set by `iccom_configure`, or the environment's.
pub(crate) fn current() -> IccomConfig {
    match CONFIG.read() {
        Ok(guard) => guard.clone().unwrap_or_else(IccomConfig::from_env),
        Err(poisoned) => poisoned
            .into_inner()
            .clone()
            .unwrap_or_else(IccomConfig::from_env),
    }
}

fn store(config: Option<IccomConfig>) {
    let mut guard = match CONFIG.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = config;
}

/// Set the process-wide configuration used by later `iccom_open` and
/// loopback calls.
///
/// A non-null `target_host` selects TCP emulation against that host; null
/// keeps the environment's binding. A null `loopback_ctl` keeps the
/// environment's control path.
///
/// # Safety
/// Each argument must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn iccom_configure(
    target_host: *const c_char,
    loopback_ctl: *const c_char,
) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();

        // SAFETY: We validate UTF-8 in helper; null is allowed.
        let host = match unsafe { transport::optional_str_arg(target_host, "target_host") } {
            Ok(v) => v,
            Err(code) => return code,
        };
        // SAFETY: As above.
        let ctl = match unsafe { transport::optional_str_arg(loopback_ctl, "loopback_ctl") } {
            Ok(v) => v,
            Err(code) => return code,
        };

        let mut config = IccomConfig::from_env();
        if let Some(host) = host {
            config = config.with_binding(Binding::tcp(host));
        }
        if let Some(ctl) = ctl {
            config = config.with_loopback_ctl(ctl);
        }
        store(Some(config));
        0
    })
}

/// Forget any `iccom_configure` settings and fall back to the environment.
#[no_mangle]
pub extern "C" fn iccom_reset_config() {
    crate::ffi_boundary((), || store(None));
}
