use std::ffi::c_void;

use iccom_transport::IccomStream;

/// Opaque connection handle returned by `iccom_open`.
pub type IccomHandle = *mut c_void;

pub(crate) struct ConnHandle {
    pub(crate) conn: IccomStream,
    pub(crate) channel: u32,
}

/// A loopback rule as C sees it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IccomLoopbackCfg {
    pub from_ch: u32,
    pub to_ch: u32,
    pub range_shift: i32,
}

#[cfg(target_os = "linux")]
pub(crate) use libc::{EBADE, ENODATA};

#[cfg(not(target_os = "linux"))]
pub(crate) const EBADE: i32 = libc::EPROTO;
#[cfg(not(target_os = "linux"))]
pub(crate) const ENODATA: i32 = libc::ENOENT;
