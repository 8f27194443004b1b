use std::fmt;

#[cfg(target_os = "linux")]
use crate::netlink::NetlinkSocket;
use crate::error::Result;
#[cfg(not(target_os = "linux"))]
use crate::error::TransportError;
use crate::tcp::TcpChannel;
use crate::traits::{Connector, IccomStream};

/// Host used by the TCP emulation unless configured otherwise.
pub const DEFAULT_TCP_HOST: &str = "localhost";

/// Which connection family carries the channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The ICCom netlink family socket of the kernel driver.
    Netlink,
    /// TCP emulation: connect to `host` with the channel number as port.
    Tcp { host: String },
}

impl Binding {
    /// TCP emulation against `host`.
    pub fn tcp(host: impl Into<String>) -> Self {
        Binding::Tcp { host: host.into() }
    }

    /// Binding name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Binding::Netlink => "netlink",
            Binding::Tcp { .. } => "tcp",
        }
    }
}

impl Default for Binding {
    /// The build-time choice: TCP to localhost with the `tcp-emulation`
    /// feature, the netlink family otherwise.
    fn default() -> Self {
        if cfg!(feature = "tcp-emulation") {
            Binding::tcp(DEFAULT_TCP_HOST)
        } else {
            Binding::Netlink
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Netlink => write!(f, "netlink"),
            Binding::Tcp { host } => write!(f, "tcp://{host}"),
        }
    }
}

impl Connector for Binding {
    type Conn = IccomStream;

    fn connect(&self, channel: u32) -> Result<IccomStream> {
        match self {
            #[cfg(target_os = "linux")]
            Binding::Netlink => Ok(IccomStream::from_netlink(NetlinkSocket::open(channel)?)),
            #[cfg(not(target_os = "linux"))]
            Binding::Netlink => Err(TransportError::Unsupported("netlink")),
            Binding::Tcp { host } => Ok(IccomStream::from_tcp(TcpChannel::connect(host, channel)?)),
        }
    }
}
