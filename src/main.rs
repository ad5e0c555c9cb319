mod cli;
mod client;
mod form;
mod logging;
mod model;
#[cfg(feature = "tui")]
mod orchestrator;
mod report;
mod submission;
#[cfg(feature = "tui")]
mod tui;
mod validation;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let interactive = args.is_interactive();
    logging::init(
        args.log_level.as_deref(),
        args.log_file.as_deref(),
        interactive,
    )?;

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success for non-TUI modes
            if !interactive {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %format!("{e:#}"), "exiting with error");
            Err(e)
        }
    }
}
