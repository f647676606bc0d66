use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber. `RUST_LOG` overrides the default level.
///
/// Output goes to stderr so command output on stdout stays parseable.
/// `log` records are forwarded through tracing-subscriber's log bridge.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();

    if let Err(err) = result {
        eprintln!("logging already initialized: {err}");
    }
}
