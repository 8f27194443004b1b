use std::io;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Connection;

/// Netlink protocol family id registered by the ICCom sockets driver.
pub const NETLINK_ICCOM: libc::c_int = 22;

/// A netlink family socket bound to one ICCom channel.
///
/// The channel number is used as the netlink port id, so the driver routes
/// messages of that channel to this socket. Writes go to the kernel.
pub struct NetlinkSocket {
    fd: OwnedFd,
    channel: u32,
}

impl NetlinkSocket {
    /// Open and bind a netlink socket for `channel`.
    pub fn open(channel: u32) -> Result<Self> {
        let target = format!("netlink:{NETLINK_ICCOM}/{channel}");

        // SAFETY: plain socket(2) call with constant arguments.
        let raw = unsafe {
            libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                NETLINK_ICCOM,
            )
        };
        if raw < 0 {
            return Err(TransportError::Connect {
                target,
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        // SAFETY: sockaddr_nl is plain old data; all-zero is a valid value.
        let mut addr: libc::sockaddr_nl = unsafe { std::mem::zeroed() };
        addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;
        addr.nl_pid = channel;
        addr.nl_groups = 0;

        // SAFETY: `addr` is a valid sockaddr_nl for the given length and `fd` is open.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                (&addr as *const libc::sockaddr_nl).cast::<libc::sockaddr>(),
                std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(TransportError::Connect {
                target,
                source: io::Error::last_os_error(),
            });
        }

        debug!(channel, "opened netlink channel socket");
        Ok(Self { fd, channel })
    }

    /// The channel (netlink port id) this socket is bound to.
    pub fn channel(&self) -> u32 {
        self.channel
    }
}

impl Connection for NetlinkSocket {
    fn raw_send(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for reads of `buf.len()` bytes.
        let n = unsafe {
            libc::write(
                self.fd.as_raw_fd(),
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn raw_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        set_rcvtimeo(self.fd.as_raw_fd(), timeout).map_err(TransportError::Io)
    }

    fn read_timeout(&self) -> Result<Option<Duration>> {
        rcvtimeo(self.fd.as_raw_fd()).map_err(TransportError::Io)
    }

    fn close(self) -> Result<()> {
        let channel = self.channel;
        let raw = self.fd.into_raw_fd();
        // SAFETY: `raw` came from an OwnedFd we just gave up, so it is closed exactly once.
        if unsafe { libc::close(raw) } < 0 {
            return Err(TransportError::Io(io::Error::last_os_error()));
        }
        debug!(channel, "closed netlink channel socket");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "netlink"
    }
}

fn set_rcvtimeo(fd: RawFd, timeout: Option<Duration>) -> io::Result<()> {
    // A zero timeval means "block forever" for SO_RCVTIMEO.
    let timeout = timeout.unwrap_or(Duration::ZERO);
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };

    // SAFETY: `tv` is a valid timeval and the length matches its size.
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_RCVTIMEO,
            (&tv as *const libc::timeval).cast::<libc::c_void>(),
            std::mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn rcvtimeo(fd: RawFd) -> io::Result<Option<Duration>> {
    let mut tv = libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    let mut len = std::mem::size_of::<libc::timeval>() as libc::socklen_t;

    // SAFETY: `tv` and `len` are valid writable pointers for the provided sizes.
    let rc = unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_RCVTIMEO,
            (&mut tv as *mut libc::timeval).cast::<libc::c_void>(),
            &mut len,
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    let timeout =
        Duration::from_secs(tv.tv_sec as u64) + Duration::from_micros(tv.tv_usec as u64);
    if timeout.is_zero() {
        Ok(None)
    } else {
        Ok(Some(timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_without_driver_reports_connect_error() {
        // Hosts without the ICCom driver refuse the protocol family.
        match NetlinkSocket::open(1) {
            Ok(socket) => {
                assert_eq!(socket.channel(), 1);
                socket.close().unwrap();
            }
            Err(err) => assert!(matches!(err, TransportError::Connect { .. })),
        }
    }

    #[test]
    fn rcvtimeo_roundtrip_on_plain_socket() {
        let (left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        let fd = left.as_raw_fd();

        assert_eq!(rcvtimeo(fd).unwrap(), None);

        set_rcvtimeo(fd, Some(Duration::from_millis(1500))).unwrap();
        assert_eq!(rcvtimeo(fd).unwrap(), Some(Duration::from_millis(1500)));

        set_rcvtimeo(fd, None).unwrap();
        assert_eq!(rcvtimeo(fd).unwrap(), None);
    }
}
