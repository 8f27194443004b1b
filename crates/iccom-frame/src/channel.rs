//! The ICCom channel address space.
//!
//! Two equally sized regions sit back to back:
//!
//! ```text
//!  MIN_CHANNEL          MAX_CHANNEL             MAX_LOOPBACK_CHANNEL
//!      |                      |                          |
//!      [---- prime channels --][--- loopback shadows ----]
//!      |<---- CHANNEL_RANGE ->|<----- CHANNEL_RANGE ---->|
//! ```
//!
//! Applications open prime channels. The shadow region only serves as the
//! destination side of a loopback rule.

use std::fmt;

use tracing::warn;

use crate::error::{FrameError, Result};

/// First prime channel.
pub const MIN_CHANNEL: u32 = 0;

/// Last prime channel.
pub const MAX_CHANNEL: u32 = 0x7FFF;

/// Number of channels in each region.
pub const CHANNEL_RANGE: u32 = MAX_CHANNEL - MIN_CHANNEL + 1;

/// Last loopback shadow channel.
pub const MAX_LOOPBACK_CHANNEL: u32 = MAX_CHANNEL + CHANNEL_RANGE;

/// A region of the channel address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelArea {
    /// `[MIN_CHANNEL, MAX_CHANNEL]`
    Prime,
    /// `(MAX_CHANNEL, MAX_LOOPBACK_CHANNEL]`
    Loopback,
    /// Both regions.
    Any,
}

impl ChannelArea {
    pub fn name(self) -> &'static str {
        match self {
            ChannelArea::Prime => "prime",
            ChannelArea::Loopback => "loopback",
            ChannelArea::Any => "any",
        }
    }

    /// Whether `channel` falls inside this area.
    pub fn contains(self, channel: u32) -> bool {
        let prime = (MIN_CHANNEL..=MAX_CHANNEL).contains(&channel);
        let shadow = (MIN_CHANNEL + CHANNEL_RANGE..=MAX_LOOPBACK_CHANNEL).contains(&channel);
        match self {
            ChannelArea::Prime => prime,
            ChannelArea::Loopback => shadow,
            ChannelArea::Any => prime || shadow,
        }
    }
}

impl fmt::Display for ChannelArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that `channel` is usable at all (prime or loopback shadow).
pub fn verify(channel: u32) -> Result<()> {
    verify_in(channel, ChannelArea::Any, None)
}

/// Returns true if `channel` lies in either region.
pub fn is_valid(channel: u32) -> bool {
    ChannelArea::Any.contains(channel)
}

/// Check `channel` against one `area`.
///
/// With a `comment` the rejection is logged, naming the channel, the comment
/// and the area. Without one it fails silently.
pub fn verify_in(channel: u32, area: ChannelArea, comment: Option<&str>) -> Result<()> {
    if area.contains(channel) {
        return Ok(());
    }

    match comment {
        Some(comment) if !comment.is_empty() => {
            warn!(channel, comment, %area, "ch {channel} ({comment}) is out of {area} ch range");
        }
        Some(_) => warn!(channel, %area, "ch {channel} is out of {area} ch range"),
        None => {}
    }
    Err(FrameError::InvalidChannel { channel, area })
}

/// The loopback shadow of a prime channel.
pub fn loopback_shadow(prime: u32) -> Result<u32> {
    verify_in(prime, ChannelArea::Prime, None)?;
    Ok(prime + CHANNEL_RANGE)
}

/// The prime channel a loopback shadow stands for.
pub fn prime_of(shadow: u32) -> Result<u32> {
    verify_in(shadow, ChannelArea::Loopback, None)?;
    Ok(shadow - CHANNEL_RANGE)
}

/// Compose a channel number from a logical unit number and a channel id.
pub const fn lun_cid_to_channel(lun: u32, cid: u32) -> u32 {
    (lun << 7) | cid
}
