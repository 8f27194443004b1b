use std::ffi::CString;
use std::sync::OnceLock;

use tempfile::TempDir;

use crate::config::iccom_configure;

static CTL_DIR: OnceLock<TempDir> = OnceLock::new();

/// Point every test at TCP on localhost and a private loopback control file.
///
/// All tests share one configuration so running them in parallel never
/// swaps it under another test.
pub(crate) fn configure_for_tests() {
    let dir = CTL_DIR.get_or_init(|| tempfile::tempdir().unwrap());
    let host = CString::new("127.0.0.1").unwrap();
    let ctl = CString::new(dir.path().join("loopbackctl").to_str().unwrap()).unwrap();

    // SAFETY: Both arguments are valid C strings for the duration of the call.
    assert_eq!(unsafe { iccom_configure(host.as_ptr(), ctl.as_ptr()) }, 0);
}
