use std::env;
use std::io;
use std::process;

use clap::Parser;
use mdp::cli::{normalize_args, Cli};
use mdp::RunOptions;

/// The main entry point for the application logic.
pub fn run() -> anyhow::Result<()> {
    // Initialize the logger. This will be configured by the RUST_LOG environment variable.
    env_logger::init();

    let Cli {
        file,
        skip_preview,
        template,
    } = parse_cli()?;

    let options = RunOptions::new(file)
        .template(template)
        .skip_preview(skip_preview);

    let mut stdout = io::stdout().lock();
    mdp::run(&options, &mut stdout)?;

    Ok(())
}

fn parse_cli() -> anyhow::Result<Cli> {
    match Cli::try_parse_from(normalize_args(env::args_os())) {
        Ok(cli) => Ok(cli),
        // Usage errors exit with 1, help and version with 0.
        Err(err) if err.use_stderr() => {
            err.print()?;
            process::exit(1);
        }
        Err(err) => err.exit(),
    }
}
