use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Effective filter. Hex dumps are info events, so asking for them lifts a
/// quieter level to info.
pub fn effective_filter(level: LogLevel, hex_dump: bool) -> LevelFilter {
    let filter = LevelFilter::from(level);
    if hex_dump && filter < LevelFilter::INFO {
        LevelFilter::INFO
    } else {
        filter
    }
}

/// Log to stderr; stdout is reserved for command output.
pub fn init_logging(format: LogFormat, level: LogLevel, hex_dump: bool) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(effective_filter(level, hex_dump))
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump_lifts_quiet_levels() {
        assert_eq!(effective_filter(LogLevel::Error, true), LevelFilter::INFO);
        assert_eq!(effective_filter(LogLevel::Off, true), LevelFilter::INFO);
        assert_eq!(effective_filter(LogLevel::Trace, true), LevelFilter::TRACE);
        assert_eq!(effective_filter(LogLevel::Error, false), LevelFilter::ERROR);
    }
}
