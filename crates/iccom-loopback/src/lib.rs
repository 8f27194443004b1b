//! Loopback routing control for the ICCom driver.
//!
//! The driver can bridge a range of prime channels onto another range,
//! typically their loopback shadows, so one process can talk to itself. The
//! rule is a singleton owned by the driver and set through a text control
//! file.

pub mod control;
pub mod error;
pub mod rule;

pub use control::{validate, LoopbackCtl, DEFAULT_LOOPBACK_CTL_PATH};
pub use error::{LoopbackError, Result};
pub use rule::{LoopbackRule, LoopbackState};
