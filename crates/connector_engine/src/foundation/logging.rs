//! Logging bootstrap for binaries
//!
//! The library only emits through `log`; hosts pick the backend. These
//! helpers wire up `env_logger` the way the demo wants it.

pub use log::{debug, info, warn, error, trace};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install `env_logger`, honoring `RUST_LOG` and falling back to
/// [`DEFAULT_FILTER`]
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install `env_logger` with a fallback filter such as `"connector_engine=debug"`
///
/// Does nothing if a logger is already installed.
pub fn init_with_filter(default_filter: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already installed, keeping it");
    }
}
