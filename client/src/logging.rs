use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Console logging for the command-line front end. `RUST_LOG` replaces the
/// default `inventory_browse=info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("inventory_browse=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
