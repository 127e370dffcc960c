//! `tracing` subscriber bootstrap.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level` when set. `json` switches to the
/// JSON formatter. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails if a global subscriber is already set
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_does_not_panic() {
        init_subscriber("warn", false);
        init_subscriber("debug", true);
    }
}
