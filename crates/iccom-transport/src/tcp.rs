use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Connection;

/// Size of the length word opening every frame on the wire.
const LENGTH_WORD_SIZE: usize = 4;

/// TCP emulation of an ICCom channel, for testing without the target system.
///
/// The channel number is the server port. TCP carries no message boundaries,
/// so each read first takes the frame's length word and then exactly the
/// aligned frame it declares, giving the same one-frame-per-read behaviour as
/// the netlink binding.
///
/// Once the peer closes the stream every read returns `Ok(0)` right away; the
/// configured read timeout no longer applies to such a connection.
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    channel: u32,
    peer: SocketAddr,
    eof: bool,
}

impl TcpChannel {
    /// Resolve `host` with `channel` as the port and connect to the first
    /// candidate that accepts.
    pub fn connect(host: &str, channel: u32) -> Result<Self> {
        let target = format!("{host}:{channel}");
        let port = u16::try_from(channel).map_err(|_| TransportError::Resolve {
            target: target.clone(),
            source: io::Error::new(ErrorKind::InvalidInput, "channel does not fit a tcp port"),
        })?;

        let candidates = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                target: target.clone(),
                source,
            })?;

        let mut last_err = None;
        for addr in candidates {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    debug!(%addr, channel, "connected tcp channel");
                    return Ok(Self {
                        stream,
                        channel,
                        peer: addr,
                        eof: false,
                    });
                }
                Err(err) => {
                    debug!(%addr, channel, error = %err, "address candidate refused connection");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            target,
            source: last_err.unwrap_or_else(|| {
                io::Error::new(ErrorKind::NotFound, "no address candidates resolved")
            }),
        })
    }

    /// Wrap an already connected stream, e.g. one accepted by a test server.
    pub fn from_stream(stream: TcpStream, channel: u32) -> Result<Self> {
        let peer = stream.peer_addr()?;
        Ok(Self {
            stream,
            channel,
            peer,
            eof: false,
        })
    }

    /// The channel this connection carries.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Address of the connected server.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Whether the peer has closed the stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Fill `buf` until it is full or the stream ends. A timeout before the
    /// first byte is reported as an error; afterwards a short count is returned.
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if filled == 0 => return Err(err),
                Err(err) => {
                    debug!(channel = self.channel, filled, error = %err, "frame read cut short");
                    break;
                }
            }
        }
        Ok(filled)
    }
}

impl Connection for TcpChannel {
    fn raw_send(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match self.stream.write(buf) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    fn raw_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.eof {
            return Ok(0);
        }

        let word_len = LENGTH_WORD_SIZE.min(buf.len());
        let got = self.read_full(&mut buf[..word_len])?;
        if got < LENGTH_WORD_SIZE {
            return Ok(got);
        }

        let declared = u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        let frame_len = (declared.saturating_add(3) & !3).clamp(LENGTH_WORD_SIZE, buf.len());

        let rest = self.read_full(&mut buf[LENGTH_WORD_SIZE..frame_len])?;
        Ok(LENGTH_WORD_SIZE + rest)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout).map_err(Into::into)
    }

    fn read_timeout(&self) -> Result<Option<Duration>> {
        self.stream.read_timeout().map_err(Into::into)
    }

    fn close(self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            // The peer already tore the connection down.
            Err(err) if err.kind() == ErrorKind::NotConnected => {}
            Err(err) => return Err(TransportError::Io(err)),
        }
        debug!(channel = self.channel, peer = %self.peer, "closed tcp channel");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "tcp"
    }
}
