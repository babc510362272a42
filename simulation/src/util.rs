use tracing_forest::ForestLayer;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// The default `Level` is `INFO`. It can be overridden with `RUST_LOG`.
pub fn init_logger() {
    if cfg!(feature = "tracing-profile") || cfg!(feature = "perfetto") {
        use tracing_profile::init_tracing;
        if let Err(error) = init_tracing() {
            eprintln!("failed to initialize tracing: {error:?}");
        }
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // A subscriber may already be installed, e.g. by another test.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ForestLayer::default())
            .try_init();
    }
}
