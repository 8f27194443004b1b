use std::fmt;
use std::ops::Index;

use bytes::BytesMut;
use iccom_frame::{
    self as frame, max_frame_size, max_payload_size, payload_offset, required_buffer_size,
    verify_in, ChannelArea, FrameError,
};
use iccom_transport::{Binding, Connector};
use tracing::{debug, trace};

use crate::error::{Result, SocketError};
use crate::observer::{render_traffic, Direction, HexDump, TrafficObserver};

/// A socket bound to one ICCom channel.
///
/// Outgoing messages are assembled in place with [`append`](Self::append)
/// and sent with [`flush`](Self::flush); incoming messages are fetched with
/// [`pull`](Self::pull) and read through [`input`](Self::input) or indexing.
/// Both buffers keep the frame header in front of the payload so neither
/// direction copies.
///
/// A socket is meant for one thread at a time. Dropping it closes it.
pub struct ChannelSocket<K: Connector = Binding> {
    connector: K,
    channel: u32,
    conn: Option<K::Conn>,
    outgoing: BytesMut,
    outgoing_payload_size: usize,
    incoming: BytesMut,
    incoming_payload_size: usize,
    debug: bool,
    observer: Box<dyn TrafficObserver + Send>,
}

impl ChannelSocket<Binding> {
    /// A closed socket for `channel` over the build-time default binding.
    pub fn new(channel: u32) -> Result<Self> {
        Self::with_connector(Binding::default(), channel)
    }
}

impl<K: Connector> ChannelSocket<K> {
    /// A closed socket for `channel` that connects through `connector`.
    pub fn with_connector(connector: K, channel: u32) -> Result<Self> {
        verify_in(channel, ChannelArea::Any, Some("socket"))?;

        let mut outgoing = BytesMut::with_capacity(max_frame_size());
        outgoing.resize(required_buffer_size(0), 0);

        Ok(Self {
            connector,
            channel,
            conn: None,
            outgoing,
            outgoing_payload_size: 0,
            incoming: BytesMut::with_capacity(max_frame_size()),
            incoming_payload_size: 0,
            debug: false,
            observer: Box::new(HexDump::default()),
        })
    }

    /// Replace the debug observer.
    pub fn with_observer(mut self, observer: impl TrafficObserver + Send + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Connect the socket. Does nothing if it is already open.
    pub fn open(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        self.conn = Some(frame::open(&self.connector, self.channel)?);
        Ok(())
    }

    /// Release the connection. Does nothing if the socket is closed.
    ///
    /// Buffered outgoing and incoming data survive a close.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            frame::close(conn);
            debug!(channel = self.channel, "socket closed");
        }
    }

    /// Append one byte to the outgoing message.
    pub fn append_byte(&mut self, byte: u8) -> &mut Self {
        self.append(&[byte])
    }

    /// Append `data` to the outgoing message.
    ///
    /// If the message would grow past [`max_payload_size`] nothing is
    /// appended; check [`output_free_space`](Self::output_free_space) first
    /// when that matters.
    pub fn append(&mut self, data: &[u8]) -> &mut Self {
        let new_size = self.outgoing_payload_size + data.len();
        if new_size > max_payload_size() {
            trace!(
                channel = self.channel,
                size = new_size,
                "outgoing message would exceed max payload, append ignored"
            );
            return self;
        }

        self.outgoing.resize(required_buffer_size(new_size), 0);
        let start = payload_offset() + self.outgoing_payload_size;
        self.outgoing[start..start + data.len()].copy_from_slice(data);
        self.outgoing_payload_size = new_size;
        self
    }

    /// [`flush_with`](Self::flush_with) that resets the message on success.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_with(true)
    }

    /// Send the outgoing message as one frame.
    ///
    /// An empty message succeeds without I/O. On failure the message is left
    /// as it was so the caller can retry or drop it.
    pub fn flush_with(&mut self, reset_on_success: bool) -> Result<()> {
        if self.outgoing_payload_size == 0 {
            return Ok(());
        }
        let channel = self.channel;
        let conn = self.conn.as_mut().ok_or(SocketError::NotOpen { channel })?;

        frame::send_nocopy(
            conn,
            &mut self.outgoing,
            payload_offset(),
            self.outgoing_payload_size,
        )?;

        if self.debug {
            self.observer
                .on_traffic(Direction::Outgoing, channel, self.output());
        }
        if reset_on_success {
            self.reset_output();
        }
        Ok(())
    }

    /// Receive one message, replacing whatever was held before.
    ///
    /// Returns the payload size. `0` means nothing arrived before the read
    /// timeout or the peer went away; the input is empty then, and after
    /// any error.
    pub fn pull(&mut self) -> Result<usize> {
        let channel = self.channel;
        let Some(conn) = self.conn.as_mut() else {
            self.reset_input();
            return Err(SocketError::NotOpen { channel });
        };

        self.incoming.resize(max_frame_size(), 0);
        let mut offset = 0usize;
        let len = match frame::receive_nocopy(conn, &mut self.incoming, &mut offset) {
            Ok(len) => len,
            Err(err) => {
                self.reset_input();
                return Err(err.into());
            }
        };
        if len == 0 {
            self.reset_input();
            return Ok(0);
        }
        if offset != payload_offset() {
            self.reset_input();
            return Err(FrameError::UnexpectedOffset {
                actual: offset,
                expected: payload_offset(),
            }
            .into());
        }

        self.incoming.truncate(required_buffer_size(len));
        self.incoming_payload_size = len;

        if self.debug {
            self.observer
                .on_traffic(Direction::Incoming, channel, self.input());
        }
        Ok(len)
    }

    /// Send `data` as one frame, bypassing the outgoing message.
    pub fn send_direct(&mut self, data: &[u8]) -> Result<()> {
        let conn = self.connection()?;
        frame::send_copy(conn, data)?;
        Ok(())
    }

    /// Receive one frame's payload into `out`, bypassing the incoming message.
    pub fn receive_direct(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let conn = self.connection()?;
        Ok(frame::receive_copy(conn, out)?)
    }

    /// Read timeout in milliseconds, `0` to block indefinitely.
    pub fn set_read_timeout(&mut self, ms: i64) -> Result<()> {
        let conn = self.connection()?;
        frame::set_read_timeout(conn, ms)?;
        Ok(())
    }

    pub fn read_timeout(&mut self) -> Result<u64> {
        let conn = self.connection()?;
        Ok(frame::read_timeout(conn)?)
    }

    /// Report every successful flush and pull to the observer.
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_observer(&mut self, observer: impl TrafficObserver + Send + 'static) {
        self.observer = Box::new(observer);
    }

    /// Payload of the outgoing message assembled so far.
    pub fn output(&self) -> &[u8] {
        &self.outgoing[payload_offset()..payload_offset() + self.outgoing_payload_size]
    }

    pub fn output_size(&self) -> usize {
        self.outgoing_payload_size
    }

    /// How many more bytes the outgoing message can take.
    pub fn output_free_space(&self) -> usize {
        max_payload_size() - self.outgoing_payload_size
    }

    /// Drop the outgoing message.
    pub fn reset_output(&mut self) {
        self.outgoing.truncate(0);
        self.outgoing.resize(required_buffer_size(0), 0);
        self.outgoing_payload_size = 0;
    }

    /// Payload of the last message pulled, empty if there is none.
    pub fn input(&self) -> &[u8] {
        if self.incoming_payload_size == 0 {
            return &[];
        }
        &self.incoming[payload_offset()..payload_offset() + self.incoming_payload_size]
    }

    pub fn input_size(&self) -> usize {
        self.incoming_payload_size
    }

    /// Drop the incoming message.
    pub fn reset_input(&mut self) {
        self.incoming.clear();
        self.incoming_payload_size = 0;
    }

    /// The outgoing message rendered as a hex dump.
    pub fn describe_output(&self, prefix: &str) -> Vec<String> {
        render_traffic(Direction::Outgoing, self.channel, self.output(), prefix)
    }

    /// The incoming message rendered as a hex dump.
    pub fn describe_input(&self, prefix: &str) -> Vec<String> {
        render_traffic(Direction::Incoming, self.channel, self.input(), prefix)
    }

    fn connection(&mut self) -> Result<&mut K::Conn> {
        let channel = self.channel;
        self.conn.as_mut().ok_or(SocketError::NotOpen { channel })
    }
}

/// Bytes of the current incoming payload. Panics past [`input_size`].
///
/// [`input_size`]: ChannelSocket::input_size
impl<K: Connector> Index<usize> for ChannelSocket<K> {
    type Output = u8;

    fn index(&self, idx: usize) -> &u8 {
        &self.input()[idx]
    }
}

impl<K: Connector> Drop for ChannelSocket<K> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<K: Connector> fmt::Debug for ChannelSocket<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSocket")
            .field("channel", &self.channel)
            .field("open", &self.is_open())
            .field("output_size", &self.outgoing_payload_size)
            .field("input_size", &self.incoming_payload_size)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::{self, ErrorKind};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use iccom_frame::{encode_frame, FrameHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE};
    use iccom_transport::{Connection, Result as TransportResult};
    use proptest::prelude::*;

    use super::*;

    #[derive(Default)]
    struct Wire {
        connects: Vec<u32>,
        closes: usize,
        sent: Vec<Vec<u8>>,
        inbound: VecDeque<Vec<u8>>,
        fail_sends: bool,
        timeout: Option<Duration>,
    }

    #[derive(Clone, Default)]
    struct MockConnector(Arc<Mutex<Wire>>);

    struct MockConn(Arc<Mutex<Wire>>);

    impl MockConnector {
        fn wire(&self) -> std::sync::MutexGuard<'_, Wire> {
            self.0.lock().unwrap()
        }

        fn push_frame(&self, payload: &[u8]) {
            let mut frame = BytesMut::new();
            encode_frame(payload, &mut frame);
            self.wire().inbound.push_back(frame.to_vec());
        }
    }

    impl Connector for MockConnector {
        type Conn = MockConn;

        fn connect(&self, channel: u32) -> TransportResult<MockConn> {
            self.wire().connects.push(channel);
            Ok(MockConn(self.0.clone()))
        }
    }

    impl Connection for MockConn {
        fn raw_send(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut wire = self.0.lock().unwrap();
            if wire.fail_sends {
                return Err(io::Error::from(ErrorKind::BrokenPipe));
            }
            wire.sent.push(buf.to_vec());
            Ok(buf.len())
        }

        fn raw_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.lock().unwrap().inbound.pop_front() {
                Some(bytes) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                None => Err(io::Error::from(ErrorKind::WouldBlock)),
            }
        }

        fn set_read_timeout(&self, timeout: Option<Duration>) -> TransportResult<()> {
            self.0.lock().unwrap().timeout = timeout;
            Ok(())
        }

        fn read_timeout(&self) -> TransportResult<Option<Duration>> {
            Ok(self.0.lock().unwrap().timeout)
        }

        fn close(self) -> TransportResult<()> {
            self.0.lock().unwrap().closes += 1;
            Ok(())
        }

        fn kind(&self) -> &'static str {
            "mock"
        }
    }

    fn open_socket(channel: u32) -> (MockConnector, ChannelSocket<MockConnector>) {
        let connector = MockConnector::default();
        let mut socket = ChannelSocket::with_connector(connector.clone(), channel).unwrap();
        socket.open().unwrap();
        (connector, socket)
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(Direction, u32, Vec<u8>)>>>);

    impl TrafficObserver for Recorder {
        fn on_traffic(&self, direction: Direction, channel: u32, payload: &[u8]) {
            self.0
                .lock()
                .unwrap()
                .push((direction, channel, payload.to_vec()));
        }
    }

    #[test]
    fn construction_rejects_invalid_channel() {
        let err = ChannelSocket::with_connector(MockConnector::default(), 0x1_0000).unwrap_err();
        assert!(matches!(
            err,
            SocketError::Frame(FrameError::InvalidChannel { .. })
        ));
    }

    #[test]
    fn append_and_flush_sends_one_frame() {
        let (connector, mut socket) = open_socket(100);

        socket.append(&[0x01, 0x02, 0x03]);
        assert_eq!(socket.output(), &[1, 2, 3]);
        socket.flush().unwrap();

        let wire = connector.wire();
        assert_eq!(wire.connects, vec![100]);
        assert_eq!(wire.sent.len(), 1);
        assert_eq!(wire.sent[0].len(), required_buffer_size(3));
        let header = FrameHeader::parse(&wire.sent[0]).unwrap();
        assert_eq!(header.len as usize, HEADER_SIZE + 3);
        drop(wire);
        assert_eq!(socket.output_size(), 0);
    }

    #[test]
    fn flush_after_reset_is_noop() {
        let (connector, mut socket) = open_socket(1);

        socket.append_byte(7).append_byte(8);
        socket.flush().unwrap();
        socket.flush().unwrap();

        assert_eq!(connector.wire().sent.len(), 1);
        assert_eq!(socket.output_free_space(), MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn flush_without_reset_keeps_message() {
        let (connector, mut socket) = open_socket(1);

        socket.append(b"again");
        socket.flush_with(false).unwrap();
        socket.flush_with(false).unwrap();

        assert_eq!(connector.wire().sent.len(), 2);
        assert_eq!(socket.output(), b"again");
    }

    #[test]
    fn failed_flush_leaves_message_untouched() {
        let (connector, mut socket) = open_socket(1);
        socket.append(b"keep me");
        let before = socket.output().to_vec();
        connector.wire().fail_sends = true;

        let err = socket.flush().unwrap_err();
        assert!(matches!(err, SocketError::Frame(FrameError::Transport(_))));
        assert_eq!(socket.output(), before.as_slice());
        assert_eq!(socket.output_size(), 7);

        connector.wire().fail_sends = false;
        socket.flush().unwrap();
        assert_eq!(connector.wire().sent.len(), 1);
    }

    #[test]
    fn append_refuses_to_exceed_max_payload() {
        let (_connector, mut socket) = open_socket(1);

        socket.append(&vec![0xAA; MAX_PAYLOAD_SIZE - 1]);
        socket.append(&[1, 2]);
        assert_eq!(socket.output_size(), MAX_PAYLOAD_SIZE - 1);

        socket.append_byte(0xBB);
        assert_eq!(socket.output_size(), MAX_PAYLOAD_SIZE);
        assert_eq!(socket.output_free_space(), 0);

        socket.append_byte(0xCC);
        assert_eq!(socket.output_size(), MAX_PAYLOAD_SIZE);
        assert_eq!(socket.output()[MAX_PAYLOAD_SIZE - 1], 0xBB);
    }

    #[test]
    fn closed_socket_refuses_io() {
        let connector = MockConnector::default();
        let mut socket = ChannelSocket::with_connector(connector.clone(), 5).unwrap();

        // Empty flush needs no connection.
        socket.flush().unwrap();
        socket.append(b"x");
        assert!(matches!(
            socket.flush(),
            Err(SocketError::NotOpen { channel: 5 })
        ));
        assert!(matches!(socket.pull(), Err(SocketError::NotOpen { .. })));
        assert!(matches!(
            socket.send_direct(b"x"),
            Err(SocketError::NotOpen { .. })
        ));
        assert!(matches!(
            socket.set_read_timeout(10),
            Err(SocketError::NotOpen { .. })
        ));
        assert!(connector.wire().connects.is_empty());
        assert!(connector.wire().sent.is_empty());
    }

    #[test]
    fn open_and_close_are_idempotent() {
        let (connector, mut socket) = open_socket(9);

        socket.open().unwrap();
        assert_eq!(connector.wire().connects.len(), 1);

        socket.close();
        socket.close();
        assert!(!socket.is_open());
        assert_eq!(connector.wire().closes, 1);

        socket.open().unwrap();
        assert!(socket.is_open());
        assert_eq!(connector.wire().connects.len(), 2);
    }

    #[test]
    fn drop_closes() {
        let (connector, socket) = open_socket(9);
        drop(socket);
        assert_eq!(connector.wire().closes, 1);
    }

    #[test]
    fn close_keeps_buffers() {
        let (connector, mut socket) = open_socket(9);
        connector.push_frame(b"in");
        socket.pull().unwrap();
        socket.append(b"out");

        socket.close();
        assert_eq!(socket.input(), b"in");
        assert_eq!(socket.output(), b"out");
    }

    #[test]
    fn pull_exposes_payload_by_index() {
        let (connector, mut socket) = open_socket(3);
        connector.push_frame(b"hello");

        assert_eq!(socket.pull().unwrap(), 5);
        assert_eq!(socket.input_size(), 5);
        assert_eq!(socket[0], b'h');
        assert_eq!(socket[4], b'o');
        assert_eq!(socket.input(), b"hello");
    }

    #[test]
    #[should_panic]
    fn index_past_input_panics() {
        let (connector, mut socket) = open_socket(3);
        connector.push_frame(b"hi");
        socket.pull().unwrap();
        let _ = socket[2];
    }

    #[test]
    fn pull_timeout_leaves_input_empty() {
        let (connector, mut socket) = open_socket(3);
        connector.push_frame(b"old");
        socket.pull().unwrap();

        socket.set_read_timeout(6000).unwrap();
        assert_eq!(socket.read_timeout().unwrap(), 6000);
        assert_eq!(socket.pull().unwrap(), 0);
        assert_eq!(socket.input_size(), 0);
        assert!(socket.input().is_empty());
    }

    #[test]
    fn pull_error_resets_input() {
        let (connector, mut socket) = open_socket(3);
        connector.push_frame(b"old");
        socket.pull().unwrap();

        let mut bad = BytesMut::new();
        encode_frame(b"abcd", &mut bad);
        FrameHeader::for_payload(100).write_to(&mut bad);
        connector.wire().inbound.push_back(bad.to_vec());

        let err = socket.pull().unwrap_err();
        assert!(err.frame().is_some_and(FrameError::is_protocol));
        assert_eq!(socket.input_size(), 0);
    }

    #[test]
    fn direct_paths_skip_buffers() {
        let (connector, mut socket) = open_socket(3);
        socket.append(b"pending");

        socket.send_direct(b"now").unwrap();
        connector.push_frame(b"reply");
        let mut out = Vec::new();
        assert_eq!(socket.receive_direct(&mut out).unwrap(), 5);

        assert_eq!(out, b"reply");
        assert_eq!(socket.output(), b"pending");
        assert_eq!(socket.input_size(), 0);
        let wire = connector.wire();
        assert_eq!(wire.sent.len(), 1);
        assert_eq!(&wire.sent[0][payload_offset()..payload_offset() + 3], b"now");
    }

    #[test]
    fn debug_mode_reports_traffic() {
        let recorder = Recorder::default();
        let connector = MockConnector::default();
        let mut socket = ChannelSocket::with_connector(connector.clone(), 42)
            .unwrap()
            .with_observer(recorder.clone());
        socket.open().unwrap();

        socket.append(b"quiet");
        socket.flush().unwrap();
        assert!(recorder.0.lock().unwrap().is_empty());

        socket.set_debug(true);
        socket.append(b"loud");
        socket.flush().unwrap();
        connector.push_frame(b"back");
        socket.pull().unwrap();

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (Direction::Outgoing, 42, b"loud".to_vec()));
        assert_eq!(seen[1], (Direction::Incoming, 42, b"back".to_vec()));
    }

    #[test]
    fn describe_renders_current_buffers() {
        let (_connector, mut socket) = open_socket(11);

        assert_eq!(
            socket.describe_input(""),
            vec!["no input data on channel 11"]
        );
        socket.append(&[0x10]);
        let lines = socket.describe_output("| ");
        assert_eq!(lines[0], "| [SND] ch 11; 1 bytes --- payload data begin ---");
        assert_eq!(lines[1], "| 0x10");
    }

    #[test]
    fn tcp_socket_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let channel = u32::from(listener.local_addr().unwrap().port());

        let mut socket = ChannelSocket::with_connector(Binding::tcp("127.0.0.1"), channel).unwrap();
        socket.open().unwrap();
        let (mut server, _) = listener.accept().unwrap();

        socket.append(b"over tcp");
        socket.flush().unwrap();

        let mut frame = vec![0u8; required_buffer_size(8)];
        io::Read::read_exact(&mut server, &mut frame).unwrap();
        io::Write::write_all(&mut server, &frame).unwrap();

        assert_eq!(socket.pull().unwrap(), 8);
        assert_eq!(socket.input(), b"over tcp");
    }

    proptest! {
        #[test]
        fn buffer_stays_aligned_while_appending(chunks in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..64), 0..32)) {
            let connector = MockConnector::default();
            let mut socket = ChannelSocket::with_connector(connector, 1).unwrap();
            let mut expected = Vec::new();

            for chunk in &chunks {
                socket.append(chunk);
                expected.extend_from_slice(chunk);
                prop_assert_eq!(socket.outgoing.len(), required_buffer_size(socket.output_size()));
            }
            prop_assert_eq!(socket.output(), expected.as_slice());
        }
    }
}
