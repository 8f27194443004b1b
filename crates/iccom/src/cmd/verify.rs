use iccom_frame::{verify_in, ChannelArea};
use serde::Serialize;

use crate::cmd::VerifyArgs;
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_fields, OutputFormat};

#[derive(Serialize, Debug, PartialEq, Eq)]
struct VerifyOutput {
    channel: u32,
    area: &'static str,
    valid: bool,
}

pub fn run(args: VerifyArgs, format: OutputFormat) -> CliResult<i32> {
    let output = check(args.channel, args.area.into());
    let fields = [
        ("channel", output.channel.to_string()),
        ("area", output.area.to_string()),
        ("valid", output.valid.to_string()),
    ];
    print_fields(&fields, &output, format);

    Ok(if output.valid { SUCCESS } else { DATA_INVALID })
}

fn check(channel: u32, area: ChannelArea) -> VerifyOutput {
    VerifyOutput {
        channel,
        area: area.name(),
        valid: verify_in(channel, area, None).is_ok(),
    }
}
