//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter.
pub const LOG_ENV: &str = "PHPGUARD_LOG";

/// Install a global fmt subscriber.
///
/// The filter comes from `PHPGUARD_LOG` when set, otherwise `default_filter`
/// (e.g. `"phpguard=info"`). Returns `false` if a subscriber was already
/// installed, which makes repeated calls from tests harmless.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
