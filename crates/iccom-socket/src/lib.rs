//! Buffered per-channel ICCom sockets.
//!
//! A [`ChannelSocket`] owns one channel connection plus two frame-sized
//! buffers: an outgoing message assembled with `append` and sent with
//! `flush`, and the last message received with `pull`. [`IccomConfig`]
//! carries the binding and loopback control path the process runs with.

pub mod config;
pub mod error;
pub mod observer;
pub mod socket;

pub use config::{IccomConfig, LOOPBACK_CTL_ENV, TARGET_HOST_ENV};
pub use error::{Result, SocketError};
pub use observer::{hex_lines, render_traffic, Direction, HexDump, TrafficObserver};
pub use socket::ChannelSocket;
