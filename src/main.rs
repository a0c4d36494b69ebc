use std::io::{self, Write};

use clap::Parser;
use color_eyre::eyre::Result;

use layerscope::cli::{self, Cli};
use layerscope::error;
use layerscope::infra::logging;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    error::install_hooks()?;

    let args = Cli::parse();
    let settings = args.load_settings()?;
    logging::init(&settings.logging.level, settings.logging.format)?;

    let store = args.settings_store();
    let output = cli::run(&args.command, &settings, store.as_ref())?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}
