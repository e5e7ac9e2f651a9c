mod app;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("papi=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    app::run()
}
