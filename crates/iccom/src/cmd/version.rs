use iccom_frame::{max_payload_size, MAX_CHANNEL, MAX_LOOPBACK_CHANNEL};
use iccom_socket::IccomConfig;
use iccom_transport::Binding;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs, config: &IccomConfig) -> CliResult<i32> {
    if !args.extended {
        println!("iccom {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: iccom");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", option_env!("ICCOM_BUILD_TARGET").unwrap_or("unknown"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "features: socket={}, loopback={}, tcp-emulation={}, cli=true",
        cfg!(feature = "socket"),
        cfg!(feature = "loopback"),
        cfg!(feature = "tcp-emulation")
    );
    println!("binding: {}", binding_summary(&config.binding));
    println!("loopback_ctl: {}", config.loopback_ctl_path.display());
    println!("max_payload: {}", max_payload_size());
    println!("channels: prime 0..={MAX_CHANNEL}, loopback {}..={MAX_LOOPBACK_CHANNEL}", MAX_CHANNEL + 1);

    Ok(SUCCESS)
}

fn binding_summary(binding: &Binding) -> String {
    match binding {
        Binding::Netlink => "netlink".to_string(),
        Binding::Tcp { host } => format!("tcp ({host}, port = channel)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_summary_names_host() {
        assert_eq!(binding_summary(&Binding::Netlink), "netlink");
        assert_eq!(
            binding_summary(&Binding::tcp("10.0.0.2")),
            "tcp (10.0.0.2, port = channel)"
        );
    }
}
