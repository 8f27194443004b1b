//! Receiving frames.

use std::io::ErrorKind;

use iccom_transport::{Connection, TransportError};
use tracing::{trace, warn};

use crate::error::{FrameError, Result};
use crate::layout::{check_frame, max_frame_size, payload_offset, HEADER_SIZE};

/// Receive one frame into `buf`, leaving the payload in place.
///
/// Returns the payload length and, on success, stores the payload offset in
/// `data_offset_out`. `Ok(0)` means nothing arrived before the read timeout
/// or the peer closed the connection; `data_offset_out` is left alone then,
/// as it is on any error.
///
/// A frame whose declared length disagrees with the bytes actually read is
/// dropped with [`FrameError::LengthMismatch`].
pub fn receive_nocopy<C: Connection + ?Sized>(
    conn: &mut C,
    buf: &mut [u8],
    data_offset_out: &mut usize,
) -> Result<usize> {
    if buf.len() <= HEADER_SIZE {
        warn!(buf_size = buf.len(), "receive buffer too small for any frame");
        return Err(FrameError::BufferTooSmall {
            size: buf.len(),
            min: HEADER_SIZE,
        });
    }

    let read = match conn.raw_read(buf) {
        Ok(n) => n,
        Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            trace!("read timed out, no data");
            return Ok(0);
        }
        Err(err) => {
            warn!(error = %err, "receiving message from channel failed");
            return Err(FrameError::Transport(TransportError::Io(err)));
        }
    };
    if read == 0 {
        trace!("connection closed by peer, no data");
        return Ok(0);
    }

    let payload_len = match check_frame(&buf[..read]) {
        Ok(len) => len,
        Err(err) => {
            warn!(read, error = %err, "dropping malformed frame");
            return Err(err);
        }
    };

    *data_offset_out = payload_offset();
    trace!(payload_len, frame_size = read, "frame received");
    Ok(payload_len)
}

/// Receive one frame and leave just its payload in `out`.
///
/// `out` is resized as needed. It is empty when nothing arrived or on error.
pub fn receive_copy<C: Connection + ?Sized>(conn: &mut C, out: &mut Vec<u8>) -> Result<usize> {
    out.clear();
    out.resize(max_frame_size(), 0);

    let mut offset = 0usize;
    let len = match receive_nocopy(conn, out, &mut offset) {
        Ok(len) => len,
        Err(err) => {
            out.clear();
            return Err(err);
        }
    };
    if len == 0 {
        out.clear();
        return Ok(0);
    }
    if offset != payload_offset() {
        out.clear();
        return Err(FrameError::UnexpectedOffset {
            actual: offset,
            expected: payload_offset(),
        });
    }

    out.copy_within(offset..offset + len, 0);
    out.truncate(len);
    Ok(len)
}
