//! Logging initialization
//!
//! The library itself only emits `tracing` events; binaries pick a profile
//! once at startup. Output goes to stderr so annotated markup written to
//! stdout stays clean.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output with debug level
    Development,
    /// JSON structured output with info level
    Production,
    /// Test-harness output, off unless `RUST_LOG` asks for it
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Default filter directive for a profile, used when `RUST_LOG` is unset
pub fn default_directive(profile: Profile) -> &'static str {
    match profile {
        Profile::Development => "revmark_core=debug,revmark=debug",
        Profile::Production => "revmark_core=info,revmark=info",
        Profile::Test => "off",
    }
}

fn filter(profile: Profile) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(profile)))
}

/// Install the global subscriber for `profile`.
///
/// Only the first call has an effect. A subscriber installed elsewhere
/// beforehand is left in place.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter(profile))
                .try_init()
                .is_ok(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter(profile))
                .try_init()
                .is_ok(),
            Profile::Test => tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(filter(profile))
                .try_init()
                .is_ok(),
        };
        if !installed {
            tracing::debug!(?profile, "global subscriber already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Development);
    }

    #[test]
    fn test_default_directives() {
        assert!(default_directive(Profile::Development).contains("revmark_core=debug"));
        assert!(default_directive(Profile::Production).contains("revmark_core=info"));
        assert_eq!(default_directive(Profile::Test), "off");
    }

    #[test]
    fn test_test_profile_filter_defaults_off() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(
                filter(Profile::Test).max_level_hint(),
                Some(tracing_subscriber::filter::LevelFilter::OFF)
            );
        }
    }
}
