use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use iccom_frame::ChannelArea;
use iccom_socket::{ChannelSocket, IccomConfig};

use crate::exit::{socket_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod echo;
pub mod listen;
pub mod loopback;
pub mod send;
pub mod verify;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one message on a channel.
    Send(SendArgs),
    /// Print messages received on a channel.
    Listen(ListenArgs),
    /// Send every message received on a channel straight back.
    Echo(EchoArgs),
    /// Control the driver's loopback routing.
    #[command(subcommand)]
    Loopback(LoopbackCommand),
    /// Check whether a channel number is valid.
    Verify(VerifyArgs),
    /// Show version information.
    Version(VersionArgs),
}

impl Command {
    /// Whether the command asked for `--debug` traffic dumps.
    pub fn hex_dump(&self) -> bool {
        match self {
            Command::Send(args) => args.debug,
            Command::Listen(args) => args.debug,
            Command::Echo(args) => args.debug,
            Command::Loopback(_) | Command::Verify(_) | Command::Version(_) => false,
        }
    }
}

pub fn run(command: Command, config: &IccomConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, config, format),
        Command::Listen(args) => listen::run(args, config, format),
        Command::Echo(args) => echo::run(args, config),
        Command::Loopback(cmd) => loopback::run(cmd, config, format),
        Command::Verify(args) => verify::run(args, format),
        Command::Version(args) => version::run(args, config),
    }
}

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("payload").required(true).args(["data", "file"])))]
pub struct SendArgs {
    /// Channel to send on.
    pub channel: u32,
    /// Raw string payload.
    #[arg(long)]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Wait for one reply on the same channel and print it.
    #[arg(long)]
    pub wait: bool,
    /// Read timeout for --wait in milliseconds, 0 to block.
    #[arg(long, default_value_t = 5000)]
    pub timeout: u64,
    /// Hex dump the traffic to the log.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Channel to listen on.
    pub channel: u32,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Give up after this many milliseconds without a message, 0 to block.
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,
    /// Hex dump the traffic to the log.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Channel to echo on.
    pub channel: u32,
    /// Exit after echoing N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Stop after this many milliseconds without a message, 0 to block.
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,
    /// Hex dump the traffic to the log.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum LoopbackCommand {
    /// Route channels [FROM, TO] to their shadows shifted by SHIFT.
    Enable(LoopbackEnableArgs),
    /// Switch loopback routing off.
    Disable,
    /// Print the current loopback rule.
    Status,
}

#[derive(Args, Debug)]
pub struct LoopbackEnableArgs {
    /// First channel of the routed range.
    pub from: u32,
    /// Last channel of the routed range.
    pub to: u32,
    /// Offset added to each routed channel.
    #[arg(allow_negative_numbers = true)]
    pub shift: i32,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Channel number to check.
    pub channel: u32,
    /// Channel area the number must fall in.
    #[arg(long, value_enum, default_value = "any")]
    pub area: AreaArg,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum AreaArg {
    Prime,
    Loopback,
    Any,
}

impl From<AreaArg> for ChannelArea {
    fn from(area: AreaArg) -> Self {
        match area {
            AreaArg::Prime => ChannelArea::Prime,
            AreaArg::Loopback => ChannelArea::Loopback,
            AreaArg::Any => ChannelArea::Any,
        }
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

/// Open a socket on `channel` with the given read timeout.
pub(crate) fn open_socket(
    config: &IccomConfig,
    channel: u32,
    timeout_ms: u64,
    debug: bool,
) -> CliResult<ChannelSocket> {
    let mut socket = config
        .socket(channel)
        .map_err(|err| socket_error("invalid channel", err))?;
    socket
        .open()
        .map_err(|err| socket_error("open failed", err))?;
    let timeout = i64::try_from(timeout_ms).unwrap_or(i64::MAX);
    socket
        .set_read_timeout(timeout)
        .map_err(|err| socket_error("setting read timeout failed", err))?;
    socket.set_debug(debug);
    Ok(socket)
}

pub(crate) fn install_ctrlc_handler() -> CliResult<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;
    Ok(running)
}
