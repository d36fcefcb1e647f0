//! Logging utilities.
//!
//! Centralizes logger initialization. The crate itself only uses the `log`
//! facade; hosts that bring their own backend can skip `init_logging`.

mod init;

pub use init::{init_logging, LoggingConfig};
