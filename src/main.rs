// Entrypoint for the interactive CLI.
// - Load configuration, open the user database and hand both to the
//   session loop.
// - The store is owned here and closed once the loop ends.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use whisperer::{
    api::QuoteClient,
    config::Config,
    logging,
    store::UserStore,
    ui::{Session, TerminalPrompter},
};

/// Register or log in, then get an inspirational quote.
#[derive(Parser, Debug)]
#[command(name = "whisperer", version)]
struct Cli {
    /// Path to the user database (overrides WHISPERER_DB)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug)?;

    let config = Config::from_env().with_db_path(cli.db);

    let store = match UserStore::open(&config.db_path) {
        Ok(store) => store,
        Err(err) => {
            error!(error = %err, "cannot open user database");
            return Err(err).context("failed to start whisperer");
        }
    };
    store
        .ensure_schema()
        .context("failed to prepare the users table")?;
    info!(path = %config.db_path.display(), "user database ready");

    let quotes = QuoteClient::from_config(&config)?;
    let mut prompter = TerminalPrompter;
    let mut stdout = std::io::stdout();
    Session::new(&store, &quotes).run(&mut prompter, &mut stdout)?;

    store.close()?;
    Ok(())
}
