// Lists the tables and registered users of the whisperer database. The file
// is opened read-only and never created.

use std::path::PathBuf;

use clap::Parser;
use whisperer::{config::Config, logging, report, store::UserStore};

/// Show the tables and users stored in the whisperer database.
#[derive(Parser, Debug)]
#[command(name = "whisperer-dbcheck", version)]
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
    let store = match UserStore::open_read_only(&config.db_path) {
        Ok(store) => store,
        Err(err) => {
            println!("[+] Error! cannot create the database connection.");
            println!("{err}");
            std::process::exit(1);
        }
    };

    report::run(&store, &mut std::io::stdout())?;
    store.close()?;
    Ok(())
}
