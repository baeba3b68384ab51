//! Logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! A module opts in by declaring the flag and importing the macros from the
//! crate root:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_debug, log_info};
//!
//! log_info!("session {} started", id);
//! ```
//! Flipping the flag to `false` silences that module without touching
//! `RUST_LOG`.

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

/// Installs the `env_logger` backend, honouring `RUST_LOG` on top of an
/// `Info` default. Safe to call more than once.
pub fn init() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
