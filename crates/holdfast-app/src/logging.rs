//! Console logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a verbosity count (`-v` = debug, `-vv` = trace).
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "holdfast_cover=debug,holdfast_sim=debug,info",
        _ => "trace",
    }
}

/// Initialize the global subscriber. Logs go to stderr so stdout stays
/// clean for reports and JSON. `RUST_LOG` overrides `verbosity`.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // Fails only when a global subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(default_filter(0), "info");
        assert!(default_filter(1).contains("holdfast_cover=debug"));
        assert_eq!(default_filter(7), "trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(0);
        init_logging(2);
    }
}
