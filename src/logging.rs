//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtered by `RUST_LOG`, or by `filter`
/// when `RUST_LOG` is unset.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case nothing changes.
pub fn init(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
