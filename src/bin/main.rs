use clap::Parser;
use color_eyre::Result;
use env_logger::Target;
use simbuild::{cli::input::CliArgs, utils::logger::config_logger, worker::run_step};

/// The entry point for the binary generated
/// for the program
fn main() -> Result<()> {
    color_eyre::install()?;
    let cli_args = CliArgs::parse();
    config_logger(cli_args.verbose, Target::Stdout).expect("Error configuring the logger");
    log::info!("Launching a new simbuild execution");
    run_step(&cli_args)?;
    log::info!("Step successfully finished");

    Ok(())
}
