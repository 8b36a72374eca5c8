use anyhow::Context;
use clap::Parser;
use hostsweep::cli::{Cli, Commands};
use hostsweep::error::CliResult;
use hostsweep::{logging, output};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet).context("failed to initialise logging") {
        output::print_error(&format!("{e:#}"));
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Scan(cmd) => {
            let settings = cli.settings()?;
            cmd.execute(&settings, cli.quiet).await
        }
        Commands::Exec(cmd) => cmd.execute().await,
        Commands::Settings(cmd) => {
            let settings = cli.settings()?;
            cmd.execute(&settings, cli.config.clone())
        }
    }
}
