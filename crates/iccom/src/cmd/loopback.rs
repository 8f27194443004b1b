use iccom_loopback::{LoopbackRule, LoopbackState};
use iccom_socket::IccomConfig;
use serde::Serialize;

use crate::cmd::LoopbackCommand;
use crate::exit::{loopback_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

#[derive(Serialize)]
struct StatusOutput<'a> {
    ctl_path: String,
    #[serde(flatten)]
    state: &'a LoopbackState,
}

pub fn run(command: LoopbackCommand, config: &IccomConfig, format: OutputFormat) -> CliResult<i32> {
    let ctl = config.loopback();
    match command {
        LoopbackCommand::Enable(args) => {
            let rule = LoopbackRule::new(args.from, args.to, args.shift);
            ctl.enable(rule.from_ch, rule.to_ch, rule.range_shift)
                .map_err(|err| loopback_error("loopback enable failed", err))?;
            tracing::info!(%rule, path = %ctl.path().display(), "loopback enabled");
        }
        LoopbackCommand::Disable => {
            ctl.disable()
                .map_err(|err| loopback_error("loopback disable failed", err))?;
            tracing::info!(path = %ctl.path().display(), "loopback disabled");
        }
        LoopbackCommand::Status => {
            let state = ctl
                .state()
                .map_err(|err| loopback_error("loopback status failed", err))?;
            let output = StatusOutput {
                ctl_path: ctl.path().display().to_string(),
                state: &state,
            };
            print_fields(&status_fields(&state), &output, format);
        }
    }
    Ok(SUCCESS)
}

fn status_fields(state: &LoopbackState) -> Vec<(&'static str, String)> {
    match state {
        LoopbackState::Inactive => vec![("state", "inactive".to_string())],
        LoopbackState::Active(rule) => vec![
            ("state", "active".to_string()),
            ("from_ch", rule.from_ch.to_string()),
            ("to_ch", rule.to_ch.to_string()),
            ("range_shift", rule.range_shift.to_string()),
        ],
    }
}
