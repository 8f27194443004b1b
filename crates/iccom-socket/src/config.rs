use std::path::PathBuf;

use iccom_loopback::{LoopbackCtl, DEFAULT_LOOPBACK_CTL_PATH};
use iccom_transport::Binding;

use crate::error::Result;
use crate::socket::ChannelSocket;

/// Selects TCP emulation against the given host.
pub const TARGET_HOST_ENV: &str = "ICCOM_TARGET_HOST";

/// Overrides the loopback control file path.
pub const LOOPBACK_CTL_ENV: &str = "ICCOM_LOOPBACK_CTL";

/// Where channels connect and where loopback is controlled.
///
/// Built once at startup and handed to whatever opens sockets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IccomConfig {
    pub binding: Binding,
    pub loopback_ctl_path: PathBuf,
}

impl Default for IccomConfig {
    fn default() -> Self {
        Self {
            binding: Binding::default(),
            loopback_ctl_path: PathBuf::from(DEFAULT_LOOPBACK_CTL_PATH),
        }
    }
}

impl IccomConfig {
    /// Defaults overridden by `ICCOM_TARGET_HOST` and `ICCOM_LOOPBACK_CTL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the environment
    /// keys. Empty values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = lookup(TARGET_HOST_ENV).filter(|h| !h.is_empty()) {
            config.binding = Binding::tcp(host);
        }
        if let Some(path) = lookup(LOOPBACK_CTL_ENV).filter(|p| !p.is_empty()) {
            config.loopback_ctl_path = PathBuf::from(path);
        }
        config
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn with_loopback_ctl(mut self, path: impl Into<PathBuf>) -> Self {
        self.loopback_ctl_path = path.into();
        self
    }

    /// A closed socket for `channel` using this binding.
    pub fn socket(&self, channel: u32) -> Result<ChannelSocket> {
        ChannelSocket::with_connector(self.binding.clone(), channel)
    }

    pub fn loopback(&self) -> LoopbackCtl {
        LoopbackCtl::new(&self.loopback_ctl_path)
    }
}
