use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, ErrorKind};
use std::time::Duration;

use iccom_transport::{Connection, Result as TransportResult};

use crate::layout::encode_frame;

/// In-memory connection: replays queued inbound datagrams, records sends.
#[derive(Debug, Default)]
pub(crate) struct MockConnection {
    pub inbound: VecDeque<io::Result<Vec<u8>>>,
    pub sent: Vec<Vec<u8>>,
    /// Accept at most this many bytes per send.
    pub accept_limit: Option<usize>,
    pub send_error: Option<ErrorKind>,
    pub timeout: Cell<Option<Duration>>,
}

impl MockConnection {
    pub fn with_frame(payload: &[u8]) -> Self {
        let mut conn = Self::default();
        conn.push_frame(payload);
        conn
    }

    pub fn push_frame(&mut self, payload: &[u8]) {
        let mut frame = bytes::BytesMut::new();
        encode_frame(payload, &mut frame);
        self.inbound.push_back(Ok(frame.to_vec()));
    }

    pub fn push_raw(&mut self, bytes: Vec<u8>) {
        self.inbound.push_back(Ok(bytes));
    }
}

impl Connection for MockConnection {
    fn raw_send(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.send_error {
            return Err(io::Error::from(kind));
        }
        let n = self.accept_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        self.sent.push(buf[..n].to_vec());
        Ok(n)
    }

    fn raw_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inbound.pop_front() {
            Some(Ok(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Err(err)) => Err(err),
            None => Err(io::Error::from(ErrorKind::WouldBlock)),
        }
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> TransportResult<()> {
        self.timeout.set(timeout);
        Ok(())
    }

    fn read_timeout(&self) -> TransportResult<Option<Duration>> {
        Ok(self.timeout.get())
    }

    fn close(self) -> TransportResult<()> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}
