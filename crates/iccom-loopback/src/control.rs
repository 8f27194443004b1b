use std::fs;
use std::path::{Path, PathBuf};

use iccom_frame::{verify_in, ChannelArea};
use tracing::{debug, info, warn};

use crate::error::{LoopbackError, Result};
use crate::rule::{LoopbackRule, LoopbackState};

/// Where the driver exposes its loopback control.
pub const DEFAULT_LOOPBACK_CTL_PATH: &str = "/proc/iccomif/loopbackctl";

const DISABLE_COMMAND: &str = "disable\n";

/// Handle on the driver's loopback control file.
///
/// The rule itself lives in the driver, so nothing is cached here: every
/// call reads or writes the file afresh. Writers in different processes race
/// and the last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackCtl {
    path: PathBuf,
}

impl Default for LoopbackCtl {
    fn default() -> Self {
        Self::new(DEFAULT_LOOPBACK_CTL_PATH)
    }
}

impl LoopbackCtl {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Route `[from_ch, to_ch]` onto the same range shifted by `range_shift`,
    /// replacing whatever rule was active.
    pub fn enable(&self, from_ch: u32, to_ch: u32, range_shift: i32) -> Result<()> {
        let rule = LoopbackRule::new(from_ch, to_ch, range_shift);
        validate(&rule)?;

        self.write(&format!("{rule}\n"))?;
        info!(from_ch, to_ch, range_shift, "loopback enabled");
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        self.write(DISABLE_COMMAND)?;
        info!("loopback disabled");
        Ok(())
    }

    /// Current state of the control file.
    pub fn state(&self) -> Result<LoopbackState> {
        let text = fs::read_to_string(&self.path).map_err(|source| LoopbackError::Io {
            path: self.path.clone(),
            source,
        })?;
        text.parse()
    }

    /// Whether a rule is active. An unreadable or garbled control file counts
    /// as inactive.
    pub fn is_active(&self) -> bool {
        match self.state() {
            Ok(state) => state.is_active(),
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "treating loopback as disabled");
                false
            }
        }
    }

    /// The active rule.
    pub fn get(&self) -> Result<LoopbackRule> {
        self.state()?.rule().ok_or(LoopbackError::NotActive)
    }

    fn write(&self, command: &str) -> Result<()> {
        fs::write(&self.path, command).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "loopback control write failed");
            LoopbackError::Io {
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// Both endpoints must be prime channels and the range must not be reversed.
pub fn validate(rule: &LoopbackRule) -> Result<()> {
    verify_in(rule.from_ch, ChannelArea::Prime, Some("from_ch"))?;
    verify_in(rule.to_ch, ChannelArea::Prime, Some("to_ch"))?;
    if rule.from_ch > rule.to_ch {
        warn!(
            from_ch = rule.from_ch,
            to_ch = rule.to_ch,
            "loopback range is reversed"
        );
        return Err(LoopbackError::ReversedRange {
            from_ch: rule.from_ch,
            to_ch: rule.to_ch,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn control() -> (TempDir, LoopbackCtl) {
        let dir = tempfile::tempdir().unwrap();
        let ctl = LoopbackCtl::new(dir.path().join("loopbackctl"));
        (dir, ctl)
    }

    #[test]
    fn enable_get_disable_cycle() {
        let (_dir, ctl) = control();

        ctl.enable(10, 20, 100).unwrap();
        assert_eq!(
            fs::read_to_string(ctl.path()).unwrap(),
            "10 20 100\n"
        );
        assert_eq!(ctl.get().unwrap(), LoopbackRule::new(10, 20, 100));
        assert!(ctl.is_active());

        ctl.disable().unwrap();
        assert!(!ctl.is_active());
        assert!(matches!(ctl.get(), Err(LoopbackError::NotActive)));
    }

    #[test]
    fn enable_replaces_previous_rule() {
        let (_dir, ctl) = control();

        ctl.enable(1, 2, 3).unwrap();
        ctl.enable(4, 5, -4).unwrap();
        assert_eq!(ctl.get().unwrap(), LoopbackRule::new(4, 5, -4));
    }

    #[test]
    fn enable_rejects_non_prime_endpoints() {
        let (_dir, ctl) = control();

        let err = ctl.enable(10, 0x8000, 1).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(ctl.enable(0x8000, 0x8001, 1), Err(LoopbackError::Channel(_))));
        assert!(!ctl.path().exists());
    }

    #[test]
    fn enable_rejects_reversed_range() {
        let (_dir, ctl) = control();

        let err = ctl.enable(20, 10, 1).unwrap_err();
        assert!(matches!(
            err,
            LoopbackError::ReversedRange {
                from_ch: 20,
                to_ch: 10
            }
        ));
        ctl.enable(7, 7, 1).unwrap();
    }

    #[test]
    fn missing_control_reads_inactive_but_get_fails() {
        let (_dir, ctl) = control();

        assert!(!ctl.is_active());
        assert!(matches!(ctl.get(), Err(LoopbackError::Io { .. })));
    }

    #[test]
    fn garbage_is_parse_error_and_inactive() {
        let (_dir, ctl) = control();
        fs::write(ctl.path(), "bogus state\n").unwrap();

        assert!(matches!(ctl.get(), Err(LoopbackError::Parse(_))));
        assert!(!ctl.is_active());
    }

    #[test]
    fn write_to_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = LoopbackCtl::new(dir.path().join("missing").join("loopbackctl"));

        assert!(matches!(ctl.disable(), Err(LoopbackError::Io { .. })));
    }

    #[test]
    fn default_path_is_driver_proc_entry() {
        assert_eq!(
            LoopbackCtl::default().path(),
            Path::new("/proc/iccomif/loopbackctl")
        );
    }
}
