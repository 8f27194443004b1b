//! Debug rendering of socket traffic.

use std::fmt;

use tracing::info;

/// Bytes per hex dump line.
pub const HEX_DUMP_WIDTH: usize = 16;

/// Which way a payload travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    fn tag(self) -> &'static str {
        match self {
            Direction::Outgoing => "[SND]",
            Direction::Incoming => "[RCV]",
        }
    }

    fn data_name(self) -> &'static str {
        match self {
            Direction::Outgoing => "output",
            Direction::Incoming => "input",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Sees every payload a debug-enabled socket sends or receives.
pub trait TrafficObserver {
    fn on_traffic(&self, direction: Direction, channel: u32, payload: &[u8]);
}

/// Logs traffic as a hex dump through `tracing` at info level.
#[derive(Debug, Clone, Default)]
pub struct HexDump {
    prefix: String,
}

impl HexDump {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TrafficObserver for HexDump {
    fn on_traffic(&self, direction: Direction, channel: u32, payload: &[u8]) {
        for line in render_traffic(direction, channel, payload, &self.prefix) {
            info!("{line}");
        }
    }
}

/// `data` as lines of up to 16 `0x..` bytes, each starting with `prefix`.
pub fn hex_lines(data: &[u8], prefix: &str) -> Vec<String> {
    if data.is_empty() {
        return vec![format!("{prefix}<no data>")];
    }
    data.chunks(HEX_DUMP_WIDTH)
        .map(|chunk| {
            let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:#04x}")).collect();
            format!("{prefix}{}", bytes.join(" "))
        })
        .collect()
}

/// The full channel-tagged dump of one payload.
pub fn render_traffic(
    direction: Direction,
    channel: u32,
    payload: &[u8],
    prefix: &str,
) -> Vec<String> {
    if payload.is_empty() {
        return vec![format!(
            "{prefix}no {} data on channel {channel}",
            direction.data_name()
        )];
    }

    let len = payload.len();
    let mut lines = Vec::with_capacity(len / HEX_DUMP_WIDTH + 3);
    lines.push(format!(
        "{prefix}{direction} ch {channel}; {len} bytes --- payload data begin ---"
    ));
    lines.extend(hex_lines(payload, prefix));
    lines.push(format!(
        "{prefix}ch {channel}; {len} bytes --- payload data end   ---"
    ));
    lines
}
