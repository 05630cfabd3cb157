//! Tracing subscriber setup.
//!
//! The workspace crates only emit `tracing` events.  Binaries call
//! [`init`] once at startup to print them.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "kalender=info,kal_alarm=info,kal_time=warn";

/// Install a global subscriber: `RUST_LOG` filtering (falling back to
/// `default_filter`) and a formatting layer on stderr.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
