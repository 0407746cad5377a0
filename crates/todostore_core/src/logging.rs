//! Single initialization point for `tracing` output.

use std::sync::Once;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV_VAR: &str = "TODOSTORE_LOG";
const DEFAULT_DIRECTIVE: &str = "todostore_core=warn,todostore_cli=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Compact human-readable lines on stderr.
    Cli,
    /// Subscriber with no output; events are dropped.
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Installs the global subscriber. Later calls are ignored.
///
/// The filter comes from `TODOSTORE_LOG` (same syntax as `RUST_LOG`) and
/// falls back to warnings from the store crates only.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Cli => {
            tracing_subscriber::fmt()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_env_filter(filter_from_env())
                .finish()
                .try_init()
                .ok();
        }
        Profile::Test => {
            tracing_subscriber::registry().try_init().ok();
        }
    });
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::{Profile, init};

    #[test]
    fn init_is_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Cli);
    }
}
