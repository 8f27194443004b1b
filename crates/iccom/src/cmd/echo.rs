use std::sync::atomic::Ordering;

use iccom_socket::{ChannelSocket, IccomConfig};

use crate::cmd::{install_ctrlc_handler, open_socket, EchoArgs};
use crate::exit::{socket_error, CliResult, SUCCESS};

pub fn run(args: EchoArgs, config: &IccomConfig) -> CliResult<i32> {
    let mut socket = open_socket(config, args.channel, args.timeout, args.debug)?;
    let running = install_ctrlc_handler()?;

    let mut echoed = 0usize;
    while running.load(Ordering::SeqCst) {
        if !echo_once(&mut socket)? {
            tracing::info!(channel = args.channel, echoed, "echo stopped, channel idle or closed");
            break;
        }
        echoed = echoed.saturating_add(1);

        if let Some(count) = args.count {
            if echoed >= count {
                break;
            }
        }
    }

    Ok(SUCCESS)
}

/// Pull one message and send it back. Returns false when nothing arrived.
fn echo_once(socket: &mut ChannelSocket) -> CliResult<bool> {
    let received = socket
        .pull()
        .map_err(|err| socket_error("receive failed", err))?;
    if received == 0 {
        return Ok(false);
    }

    tracing::info!(channel = socket.channel(), size = received, "echoing message");

    let payload = socket.input().to_vec();
    socket.append(&payload);
    socket
        .flush()
        .map_err(|err| socket_error("echo send failed", err))?;
    Ok(true)
}
