use tally_core::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_logging(config: &LoggingConfig) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        if env_filter == "debug" {
            EnvFilter::new("warn,tally_core=debug,tally=debug")
        } else if env_filter == "trace" {
            EnvFilter::new("warn,tally_core=trace,tally=trace")
        } else {
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("warn,tally_core=debug,tally=debug"))
        }
    } else {
        let level = config.level.as_str();
        EnvFilter::try_new(format!("warn,tally_core={level},tally={level}"))
            .unwrap_or_else(|_| EnvFilter::new("warn,tally_core=info,tally=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}
