use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Log lines go to stderr so they do not
/// interleave with the menu and report previews on stdout.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("retail_dashboard=info"));
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
