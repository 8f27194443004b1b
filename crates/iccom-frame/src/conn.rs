//! Opening, closing and timing out channel connections.

use std::time::Duration;

use iccom_transport::{Connection, Connector};
use tracing::{debug, warn};

use crate::channel::{verify_in, ChannelArea};
use crate::error::{FrameError, Result};

/// Open a connection for `channel`.
///
/// The channel is validated against the whole address space first; the
/// connector never sees an invalid channel.
pub fn open<K: Connector>(connector: &K, channel: u32) -> Result<K::Conn> {
    verify_in(channel, ChannelArea::Any, Some("open"))?;

    match connector.connect(channel) {
        Ok(conn) => {
            debug!(channel, kind = conn.kind(), "channel opened");
            Ok(conn)
        }
        Err(err) => {
            warn!(channel, error = %err, "failed to open channel");
            Err(err.into())
        }
    }
}

/// Release a connection. A failure to release it is logged, not returned.
pub fn close<C: Connection>(conn: C) {
    let kind = conn.kind();
    if let Err(err) = conn.close() {
        warn!(kind, error = %err, "failed to close channel connection");
    }
}

/// Set the read timeout in milliseconds. `0` blocks indefinitely.
pub fn set_read_timeout<C: Connection + ?Sized>(conn: &C, ms: i64) -> Result<()> {
    if ms < 0 {
        warn!(ms, "read timeout must be >= 0");
        return Err(FrameError::InvalidTimeout(ms));
    }
    let timeout = (ms > 0).then(|| Duration::from_millis(ms as u64));
    conn.set_read_timeout(timeout)?;
    Ok(())
}

/// Current read timeout in milliseconds. `0` means reads block indefinitely.
pub fn read_timeout<C: Connection + ?Sized>(conn: &C) -> Result<u64> {
    let timeout = conn.read_timeout()?;
    Ok(timeout.map_or(0, |t| t.as_millis() as u64))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::net::TcpListener;

    use iccom_transport::{Binding, Result as TransportResult, TransportError};

    use super::*;
    use crate::test_support::MockConnection;

    struct RecordingConnector {
        calls: RefCell<Vec<u32>>,
    }

    impl Connector for RecordingConnector {
        type Conn = MockConnection;

        fn connect(&self, channel: u32) -> TransportResult<MockConnection> {
            self.calls.borrow_mut().push(channel);
            Ok(MockConnection::default())
        }
    }

    #[test]
    fn open_rejects_invalid_channel_before_connecting() {
        let connector = RecordingConnector {
            calls: RefCell::new(Vec::new()),
        };

        let err = open(&connector, 0x1_0000).unwrap_err();
        assert!(matches!(err, FrameError::InvalidChannel { .. }));
        assert!(err.is_validation());
        assert!(connector.calls.borrow().is_empty());
    }

    #[test]
    fn open_accepts_shadow_channels() {
        let connector = RecordingConnector {
            calls: RefCell::new(Vec::new()),
        };

        open(&connector, 0x8001).unwrap();
        assert_eq!(*connector.calls.borrow(), vec![0x8001]);
    }

    #[test]
    fn open_surfaces_connect_failure_as_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let channel = u32::from(listener.local_addr().unwrap().port());
        drop(listener);

        let err = open(&Binding::tcp("127.0.0.1"), channel).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Connect { .. })
        ));
        assert!(err.is_transport());
    }

    #[test]
    fn timeout_zero_means_block_forever() {
        let conn = MockConnection::default();

        set_read_timeout(&conn, 6000).unwrap();
        assert_eq!(read_timeout(&conn).unwrap(), 6000);

        set_read_timeout(&conn, 0).unwrap();
        assert_eq!(conn.timeout.get(), None);
        assert_eq!(read_timeout(&conn).unwrap(), 0);
    }

    #[test]
    fn negative_timeout_rejected() {
        let conn = MockConnection::default();
        conn.timeout.set(Some(Duration::from_millis(10)));

        let err = set_read_timeout(&conn, -1).unwrap_err();
        assert!(matches!(err, FrameError::InvalidTimeout(-1)));
        assert_eq!(conn.timeout.get(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn close_is_silent() {
        close(MockConnection::default());
    }
}
