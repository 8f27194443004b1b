use std::fs;

use iccom_frame::max_payload_size;
use iccom_socket::IccomConfig;

use crate::cmd::{open_socket, SendArgs};
use crate::exit::{socket_error, CliError, CliResult, DATA_INVALID, SUCCESS, TIMEOUT};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SendArgs, config: &IccomConfig, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    check_payload(&payload)?;

    let mut socket = open_socket(config, args.channel, args.timeout, args.debug)?;
    socket.append(&payload);
    socket
        .flush()
        .map_err(|err| socket_error("send failed", err))?;
    tracing::debug!(channel = args.channel, size = payload.len(), "message sent");

    if !args.wait {
        return Ok(SUCCESS);
    }

    let received = socket
        .pull()
        .map_err(|err| socket_error("receive failed", err))?;
    if received == 0 {
        return Err(CliError::new(
            TIMEOUT,
            format!("no reply on channel {}", args.channel),
        ));
    }
    print_frame(args.channel, socket.input(), format);
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(Vec::new())
}

/// The socket drops oversized appends silently, so refuse them up front.
fn check_payload(payload: &[u8]) -> CliResult<()> {
    if payload.is_empty() {
        return Err(CliError::new(DATA_INVALID, "payload is empty"));
    }
    if payload.len() > max_payload_size() {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "payload of {} bytes exceeds the {} byte limit",
                payload.len(),
                max_payload_size()
            ),
        ));
    }
    Ok(())
}
