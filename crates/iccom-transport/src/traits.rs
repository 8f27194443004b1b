use std::io;
use std::time::Duration;

use crate::error::Result;
#[cfg(target_os = "linux")]
use crate::netlink::NetlinkSocket;
use crate::tcp::TcpChannel;

/// A connected, datagram-preserving byte connection for one channel.
///
/// Every `raw_send` carries exactly one frame and every `raw_read` returns
/// at most one frame. A read timeout is reported as an
/// [`io::ErrorKind::WouldBlock`] or [`io::ErrorKind::TimedOut`] error, and
/// end-of-stream as `Ok(0)`.
pub trait Connection {
    /// Write one complete frame. Returns the number of bytes accepted.
    fn raw_send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Read one frame into `buf`. Returns the number of bytes read.
    fn raw_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Set the read timeout. `None` blocks indefinitely.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()>;

    /// Current read timeout. `None` means reads block indefinitely.
    fn read_timeout(&self) -> Result<Option<Duration>>;

    /// Release the connection, reporting a failure to release it.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Binding name for diagnostics.
    fn kind(&self) -> &'static str;
}

/// Establishes connections addressed by channel number.
pub trait Connector {
    type Conn: Connection;

    /// Connect to `channel`. The channel is assumed already validated.
    fn connect(&self, channel: u32) -> Result<Self::Conn>;
}

/// A connection over whichever binding was selected.
pub struct IccomStream {
    inner: IccomStreamInner,
}

enum IccomStreamInner {
    #[cfg(target_os = "linux")]
    Netlink(NetlinkSocket),
    Tcp(TcpChannel),
}

impl IccomStream {
    #[cfg(target_os = "linux")]
    pub(crate) fn from_netlink(socket: NetlinkSocket) -> Self {
        Self {
            inner: IccomStreamInner::Netlink(socket),
        }
    }

    pub(crate) fn from_tcp(channel: TcpChannel) -> Self {
        Self {
            inner: IccomStreamInner::Tcp(channel),
        }
    }

    /// The channel this stream was opened for.
    pub fn channel(&self) -> u32 {
        match &self.inner {
            #[cfg(target_os = "linux")]
            IccomStreamInner::Netlink(socket) => socket.channel(),
            IccomStreamInner::Tcp(tcp) => tcp.channel(),
        }
    }
}

impl Connection for IccomStream {
    fn raw_send(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            #[cfg(target_os = "linux")]
            IccomStreamInner::Netlink(socket) => socket.raw_send(buf),
            IccomStreamInner::Tcp(tcp) => tcp.raw_send(buf),
        }
    }

    fn raw_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            #[cfg(target_os = "linux")]
            IccomStreamInner::Netlink(socket) => socket.raw_read(buf),
            IccomStreamInner::Tcp(tcp) => tcp.raw_read(buf),
        }
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(target_os = "linux")]
            IccomStreamInner::Netlink(socket) => socket.set_read_timeout(timeout),
            IccomStreamInner::Tcp(tcp) => tcp.set_read_timeout(timeout),
        }
    }

    fn read_timeout(&self) -> Result<Option<Duration>> {
        match &self.inner {
            #[cfg(target_os = "linux")]
            IccomStreamInner::Netlink(socket) => socket.read_timeout(),
            IccomStreamInner::Tcp(tcp) => tcp.read_timeout(),
        }
    }

    fn close(self) -> Result<()> {
        match self.inner {
            #[cfg(target_os = "linux")]
            IccomStreamInner::Netlink(socket) => socket.close(),
            IccomStreamInner::Tcp(tcp) => tcp.close(),
        }
    }

    fn kind(&self) -> &'static str {
        match &self.inner {
            #[cfg(target_os = "linux")]
            IccomStreamInner::Netlink(socket) => socket.kind(),
            IccomStreamInner::Tcp(tcp) => tcp.kind(),
        }
    }
}

impl std::fmt::Debug for IccomStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IccomStream")
            .field("type", &self.kind())
            .field("channel", &self.channel())
            .finish()
    }
}
