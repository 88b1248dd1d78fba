pub mod config;
pub mod models;
pub mod pipeline;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr. `RUST_LOG` wins over both flags.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let fallback = if quiet {
        "error"
    } else if verbose {
        "outbound_engine=debug,outbound=debug,warn"
    } else {
        config::default_log_filter()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
