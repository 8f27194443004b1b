//! User-space access to ICCom channels.
//!
//! ICCom multiplexes many numbered channels over one kernel netlink family.
//! This crate lets a process open a channel, exchange bounded messages with
//! minimal copying and steer the driver's loopback routing.
//!
//! # Crate Structure
//!
//! - [`transport`]: channel connections (netlink family or TCP emulation)
//! - [`frame`]: frame layout, channel numbers and zero-copy send/receive
//! - [`socket`]: buffered per-channel sockets and configuration (behind `socket` feature)
//! - [`loopback`]: driver loopback control (behind `loopback` feature)

/// Re-export transport types.
pub mod transport {
    pub use iccom_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use iccom_frame::*;
}

/// Re-export socket types (requires `socket` feature).
#[cfg(feature = "socket")]
pub mod socket {
    pub use iccom_socket::*;
}

/// Re-export loopback control types (requires `loopback` feature).
#[cfg(feature = "loopback")]
pub mod loopback {
    pub use iccom_loopback::*;
}
