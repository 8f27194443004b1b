//! ICCom message framing on top of a channel connection.
//!
//! Every message travels as one frame: a 16-byte netlink-compatible header
//! followed by the payload and padded to a 4-byte boundary. The payload
//! always starts at [`payload_offset`], so callers can build frames in place
//! and send them without copying ([`send_nocopy`]) or let this crate do the
//! copying for them ([`send_copy`], [`receive_copy`]).
//!
//! Channels are plain numbers in a two-region address space, see [`channel`].

pub mod channel;
pub mod conn;
pub mod error;
pub mod layout;
pub mod reader;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use channel::{
    is_valid, lun_cid_to_channel, verify, verify_in, ChannelArea, CHANNEL_RANGE, MAX_CHANNEL,
    MAX_LOOPBACK_CHANNEL, MIN_CHANNEL,
};
pub use conn::{close, open, read_timeout, set_read_timeout};
pub use error::{FrameError, Result};
pub use layout::{
    check_frame, encode_frame, max_frame_size, max_payload_size, payload_offset,
    required_buffer_size, FrameHeader, FRAME_ALIGN, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use reader::{receive_copy, receive_nocopy};
pub use writer::{send_copy, send_nocopy};
