//! Conditional logging macros that check a module-level `ENABLE_LOGS` flag.
//!
//! Modules with hot loops (the rule scheduler, store enumeration) define
//! `const ENABLE_LOGS: bool` and use these macros so their chatter can be
//! silenced without touching the log filter. Everything else calls
//! `log::{info,warn,error}` directly.

/// Initialize the `env_logger` backend. Reads `RUST_LOG`; defaults to `info`.
///
/// Host applications embedding the engine call this once at startup. Safe to
/// call from tests; repeated initialization is ignored.
pub fn init() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Info-level logging gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn-level logging gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error-level logging gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
