mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use iccom_socket::{IccomConfig, LOOPBACK_CTL_ENV, TARGET_HOST_ENV};
use iccom_transport::Binding;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "iccom", version, about = "ICCom channel CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Use TCP emulation against HOST (port = channel).
    #[arg(long, value_name = "HOST", env = TARGET_HOST_ENV, global = true)]
    host: Option<String>,

    /// Use the kernel netlink family even if a host is configured.
    #[arg(long, global = true)]
    netlink: bool,

    /// Loopback control file.
    #[arg(long, value_name = "PATH", env = LOOPBACK_CTL_ENV, global = true)]
    loopback_ctl: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config(&self) -> IccomConfig {
        let mut config = IccomConfig::default();
        if self.netlink {
            config = config.with_binding(Binding::Netlink);
        } else if let Some(host) = self.host.as_deref().filter(|h| !h.is_empty()) {
            config = config.with_binding(Binding::tcp(host));
        }
        if let Some(path) = &self.loopback_ctl {
            config = config.with_loopback_ctl(path);
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.command.hex_dump());

    let config = cli.config();
    tracing::debug!(binding = config.binding.name(), "configuration resolved");

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &config, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::LoopbackCommand;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["iccom", "send", "7", "--data", "hello"])
            .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.channel, 7);
                assert_eq!(args.timeout, 5000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "iccom", "send", "7", "--data", "hello", "--file", "/tmp/x",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn send_requires_a_payload() {
        let err = Cli::try_parse_from(["iccom", "send", "7"]).expect_err("payload is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_loopback_enable_with_negative_shift() {
        let cli = Cli::try_parse_from(["iccom", "loopback", "enable", "1", "10", "-3"])
            .expect("loopback args should parse");
        match cli.command {
            Command::Loopback(LoopbackCommand::Enable(args)) => {
                assert_eq!((args.from, args.to, args.shift), (1, 10, -3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn host_flag_selects_tcp() {
        let cli = Cli::try_parse_from([
            "iccom",
            "--host",
            "10.0.0.2",
            "--loopback-ctl",
            "/tmp/ctl",
            "verify",
            "5",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.binding, Binding::tcp("10.0.0.2"));
        assert_eq!(config.loopback_ctl_path, PathBuf::from("/tmp/ctl"));
    }

    #[test]
    fn netlink_flag_overrides_host() {
        let cli = Cli::try_parse_from(["iccom", "--host", "h", "--netlink", "verify", "5"]).unwrap();
        assert_eq!(cli.config().binding, Binding::Netlink);
    }
}
