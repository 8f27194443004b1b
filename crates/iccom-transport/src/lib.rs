//! Byte connections underneath ICCom channels.
//!
//! Two interchangeable bindings carry the same datagram framing:
//! - the ICCom netlink family socket exposed by the kernel driver (Linux)
//! - a TCP emulation where the channel number is the service port
//!
//! This is the lowest layer. Framing and buffering are written once against
//! the [`Connection`] trait and never per binding.

pub mod binding;
pub mod error;
#[cfg(target_os = "linux")]
pub mod netlink;
pub mod tcp;
pub mod traits;

pub use binding::{Binding, DEFAULT_TCP_HOST};
pub use error::{Result, TransportError};
#[cfg(target_os = "linux")]
pub use netlink::{NetlinkSocket, NETLINK_ICCOM};
pub use tcp::TcpChannel;
pub use traits::{Connection, Connector, IccomStream};
