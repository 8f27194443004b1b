//! Sending frames.

use bytes::BytesMut;
use iccom_transport::{Connection, TransportError};
use tracing::{trace, warn};

use crate::error::{FrameError, Result};
use crate::layout::{
    encode_frame, max_payload_size, payload_offset, required_buffer_size, FrameHeader,
};

/// Send one frame whose payload is already in place inside `buf`.
///
/// `buf` must be exactly [`required_buffer_size`]`(data_size)` bytes with
/// the payload at [`payload_offset`]. The header region is overwritten with
/// a freshly stamped header and the whole buffer goes out in one write. A
/// write that accepts fewer bytes is a [`FrameError::ShortWrite`]; nothing is
/// retried.
pub fn send_nocopy<C: Connection + ?Sized>(
    conn: &mut C,
    buf: &mut [u8],
    data_offset: usize,
    data_size: usize,
) -> Result<()> {
    let expected = required_buffer_size(data_size);
    if buf.len() != expected {
        warn!(buf_size = buf.len(), data_size, "buffer size doesn't match data size");
        return Err(FrameError::BufferSizeMismatch {
            actual: buf.len(),
            expected,
            payload: data_size,
        });
    }
    if data_offset != payload_offset() {
        warn!(
            data_offset,
            expected = payload_offset(),
            "payload offset doesn't match expected value"
        );
        return Err(FrameError::DataOffsetMismatch {
            actual: data_offset,
            expected: payload_offset(),
        });
    }
    if data_size > max_payload_size() {
        warn!(data_size, max = max_payload_size(), "message too large to send");
        return Err(FrameError::PayloadTooLarge {
            size: data_size,
            max: max_payload_size(),
        });
    }
    if data_size == 0 {
        warn!("message to send is of zero size");
        return Err(FrameError::EmptyPayload);
    }

    FrameHeader::for_payload(data_size).write_to(buf);

    let written = conn.raw_send(buf).map_err(|err| {
        warn!(error = %err, "sending message to channel failed");
        FrameError::Transport(TransportError::Io(err))
    })?;
    if written != buf.len() {
        warn!(written, expected = buf.len(), "message truncation occurred");
        return Err(FrameError::ShortWrite {
            written,
            expected: buf.len(),
        });
    }

    trace!(data_size, frame_size = buf.len(), "frame sent");
    Ok(())
}

/// Send `data` as one frame, copying it into a scratch frame buffer first.
pub fn send_copy<C: Connection + ?Sized>(conn: &mut C, data: &[u8]) -> Result<()> {
    if data.len() > max_payload_size() {
        warn!(size = data.len(), max = max_payload_size(), "message too large to send");
        return Err(FrameError::PayloadTooLarge {
            size: data.len(),
            max: max_payload_size(),
        });
    }
    if data.is_empty() {
        warn!("zero data size, nothing to send");
        return Err(FrameError::EmptyPayload);
    }

    let mut scratch = BytesMut::with_capacity(required_buffer_size(data.len()));
    encode_frame(data, &mut scratch);
    send_nocopy(conn, &mut scratch, payload_offset(), data.len())
}
