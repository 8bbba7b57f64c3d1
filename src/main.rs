use anyhow::Result;
use clap::Parser;

use classr::cli::{Cli, Commands};
use classr::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.command.config_args().resolve()?;
    let log_file = cli
        .command
        .logs_to_file()
        .then(|| config.storage.log_file());
    logging::init(log_file.as_deref())?;

    match cli.command {
        Commands::Serve { port, host, .. } => {
            classr::cli::serve(config, port, host).await?;
        }
        Commands::Predict {
            image,
            run_id,
            json,
            ..
        } => {
            classr::cli::predict(config, image, run_id, json).await?;
        }
        Commands::Promote { run_id, .. } => {
            classr::cli::promote(config, run_id).await?;
        }
        Commands::Info { run_id, .. } => {
            classr::cli::info(config, run_id).await?;
        }
    }

    Ok(())
}
