//! CLI commands
//!
//! Provides the server entry point plus offline helpers for the model volume.

mod info;
mod predict;
mod promote;
mod serve;

pub use info::info;
pub use predict::predict;
pub use promote::promote;
pub use serve::serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::ClassrConfig;
use crate::loader::{self, RunId};

/// Classr - image classification inference server
#[derive(Parser)]
#[command(name = "classr")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Configuration file (.yaml, .yml or .json)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Shared volume root (overrides CLASSR_VOLUME_DIR and the config file)
    #[arg(long)]
    pub volume: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load the effective configuration
    pub fn resolve(&self) -> Result<ClassrConfig> {
        ClassrConfig::resolve(self.config.as_deref(), self.volume.clone())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the classification server
    Serve {
        #[command(flatten)]
        args: ConfigArgs,

        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,
    },

    /// Classify a single image
    Predict {
        /// Image file to classify
        image: PathBuf,

        /// Run to load (default: the production run from the pointer file)
        #[arg(long)]
        run_id: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        args: ConfigArgs,
    },

    /// Mark a run as the production model without a running server
    Promote {
        /// Run identifier (an optional `run_id=` prefix is stripped)
        run_id: String,

        #[command(flatten)]
        args: ConfigArgs,
    },

    /// Show volume layout and model information
    Info {
        /// Run to inspect (default: the production run)
        #[arg(long)]
        run_id: Option<String>,

        #[command(flatten)]
        args: ConfigArgs,
    },
}

impl Commands {
    pub fn config_args(&self) -> &ConfigArgs {
        match self {
            Commands::Serve { args, .. }
            | Commands::Predict { args, .. }
            | Commands::Promote { args, .. }
            | Commands::Info { args, .. } => args,
        }
    }

    /// Commands that append to the inference log on the volume
    pub fn logs_to_file(&self) -> bool {
        matches!(self, Commands::Serve { .. } | Commands::Predict { .. })
    }
}

/// Explicit run id if given, otherwise the production run from the pointer file
fn resolve_run(config: &ClassrConfig, run_id: Option<&str>) -> Result<RunId> {
    let run = match run_id {
        Some(raw) => RunId::parse(raw)?,
        None => loader::read_pointer(&config.storage.pointer_file())?,
    };
    Ok(run)
}
