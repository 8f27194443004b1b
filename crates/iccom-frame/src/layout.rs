//! Frame layout: where the payload sits inside a transport buffer.
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────┬───────────┐
//! │ Header (16B, host order) │ Payload              │ Padding   │
//! │ len:u32 type:u16         │ (len - 16 bytes)     │ (0..3B)   │
//! │ flags:u16 seq:u32 pid:u32│                      │           │
//! └──────────────────────────┴──────────────────────┴───────────┘
//! ```
//!
//! The header is netlink-compatible. `len` counts header and payload but not
//! the padding that brings the frame to a multiple of [`FRAME_ALIGN`].

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Frames are padded to a multiple of this many bytes.
pub const FRAME_ALIGN: usize = 4;

/// Largest payload a single frame may carry.
pub const MAX_PAYLOAD_SIZE: usize = 4096;

/// Round `len` up to the frame alignment.
pub const fn align_up(len: usize) -> usize {
    (len + FRAME_ALIGN - 1) & !(FRAME_ALIGN - 1)
}

/// Byte offset of the payload within a frame buffer.
pub const fn payload_offset() -> usize {
    HEADER_SIZE
}

/// Size of the buffer holding a full frame for `payload_len` payload bytes.
pub const fn required_buffer_size(payload_len: usize) -> usize {
    align_up(HEADER_SIZE + payload_len)
}

/// Largest payload a single frame may carry.
pub const fn max_payload_size() -> usize {
    MAX_PAYLOAD_SIZE
}

/// Size of the buffer holding the largest possible frame.
pub const fn max_frame_size() -> usize {
    required_buffer_size(MAX_PAYLOAD_SIZE)
}

/// The fixed frame header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameHeader {
    /// Header plus payload length, padding excluded.
    pub len: u32,
    pub msg_type: u16,
    pub flags: u16,
    pub seq: u32,
    pub pid: u32,
}

impl FrameHeader {
    /// The header a sender stamps for `payload_len` bytes: every field but
    /// `len` is zero.
    pub fn for_payload(payload_len: usize) -> Self {
        Self {
            len: (HEADER_SIZE + payload_len) as u32,
            ..Self::default()
        }
    }

    /// Payload length implied by `len`, or `None` if `len` is shorter than
    /// the header itself.
    pub fn payload_len(&self) -> Option<usize> {
        (self.len as usize).checked_sub(HEADER_SIZE)
    }

    /// Write the header into the first [`HEADER_SIZE`] bytes of `dst`.
    ///
    /// Panics if `dst` is shorter than the header.
    pub fn write_to(&self, dst: &mut [u8]) {
        let mut dst = &mut dst[..HEADER_SIZE];
        dst.put_u32_ne(self.len);
        dst.put_u16_ne(self.msg_type);
        dst.put_u16_ne(self.flags);
        dst.put_u32_ne(self.seq);
        dst.put_u32_ne(self.pid);
    }

    /// Read a header from the start of `src`, if it is long enough.
    pub fn parse(src: &[u8]) -> Option<Self> {
        if src.len() < HEADER_SIZE {
            return None;
        }
        let mut src = &src[..HEADER_SIZE];
        Some(Self {
            len: src.get_u32_ne(),
            msg_type: src.get_u16_ne(),
            flags: src.get_u16_ne(),
            seq: src.get_u32_ne(),
            pid: src.get_u32_ne(),
        })
    }
}

/// Lay out a complete frame for `payload` at the end of `dst`.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    let total = required_buffer_size(payload.len());
    let start = dst.len();
    dst.resize(start + total, 0);
    let frame = &mut dst[start..];
    FrameHeader::for_payload(payload.len()).write_to(frame);
    frame[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);
}

/// Check that `frame` (exactly the bytes read off the wire) is one well
/// formed frame and return its payload length.
pub fn check_frame(frame: &[u8]) -> Result<usize> {
    let header = FrameHeader::parse(frame).ok_or(FrameError::Truncated {
        len: frame.len(),
        min: HEADER_SIZE,
    })?;

    let declared = header.len as usize;
    let mismatch = |expected| FrameError::LengthMismatch {
        declared,
        expected,
        actual: frame.len(),
    };

    let payload_len = header.payload_len().ok_or_else(|| mismatch(HEADER_SIZE))?;
    let expected = required_buffer_size(payload_len);
    if frame.len() != expected {
        return Err(mismatch(expected));
    }
    Ok(payload_len)
}
