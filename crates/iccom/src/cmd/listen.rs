use std::sync::atomic::Ordering;

use iccom_socket::IccomConfig;

use crate::cmd::{install_ctrlc_handler, open_socket, ListenArgs};
use crate::exit::{socket_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, config: &IccomConfig, format: OutputFormat) -> CliResult<i32> {
    let mut socket = open_socket(config, args.channel, args.timeout, args.debug)?;
    let running = install_ctrlc_handler()?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let received = socket
            .pull()
            .map_err(|err| socket_error("receive failed", err))?;

        if received == 0 {
            // Blocking reads only come back empty once the peer is gone.
            if args.timeout == 0 {
                tracing::info!(channel = args.channel, "channel closed by peer");
                break;
            }
            return Err(CliError::new(
                TIMEOUT,
                format!(
                    "no message on channel {} within {} ms",
                    args.channel, args.timeout
                ),
            ));
        }

        print_frame(args.channel, socket.input(), format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    Ok(SUCCESS)
}
