use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing to stderr, filtered by `RUST_LOG`
/// (default `outline_checker=info`).
///
/// Hosts that install their own subscriber should not call this.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "outline_checker=info".into()),
    );

    // try_init: a host or an earlier test may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
