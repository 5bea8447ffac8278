// Tracing setup. Logs go to stderr and default to `warn` so they stay out of
// the way of the interactive prompts; `--debug` or RUST_LOG turns them up.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init(debug: bool) -> Result<()> {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
