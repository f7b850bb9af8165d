//! Tracing subscriber setup
//!
//! Log lines go to stderr so command output on stdout stays clean. `RUST_LOG`
//! wins over the level chosen from `-q`/`-v`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Verbosity;

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(verbosity: Verbosity) -> String {
    format!("smilecare={}", verbosity.log_filter())
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbosity: Verbosity, color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(color)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_per_verbosity() {
        assert_eq!(default_filter(Verbosity::Quiet), "smilecare=error");
        assert_eq!(default_filter(Verbosity::Normal), "smilecare=warn");
        assert_eq!(default_filter(Verbosity::Verbose), "smilecare=info");
        assert_eq!(default_filter(Verbosity::VeryVerbose), "smilecare=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(Verbosity::Normal, false);
        init(Verbosity::Verbose, false);
    }
}
