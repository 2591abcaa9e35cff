//! CLI parser and dispatch.

mod commands;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Settings, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "prompts")]
#[command(about = "Extract prompt cards, host their images, and import them into the backend")]
#[command(version)]
pub struct Cli {
    /// Config file path (YAML, or TOML by extension)
    #[arg(short, long, global = true, env = "PROMPTS_CONFIG")]
    config: Option<PathBuf>,

    /// Only log warnings and errors; show a progress bar instead
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if quiet mode is enabled (for early logging setup).
pub fn is_quiet() -> bool {
    std::env::args().any(|arg| arg == "-q" || arg == "--quiet")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract prompt cards from the HTML page and download their images
    Extract {
        /// Source HTML page (defaults to pipeline.source_html)
        #[arg(long)]
        html: Option<PathBuf>,
        /// Checkpoint to write (defaults to pipeline.extracted_checkpoint)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload downloaded images and record their short references
    Upload {
        /// Extraction checkpoint to read
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Checkpoint to write (must differ from the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import prompts into the backend in batches
    Import {
        /// Promotion checkpoint to read
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Prompts per request (overrides pipeline.batch_size)
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Validate and plan batches without submitting
        #[arg(long)]
        dry_run: bool,
        /// Skip the listing check after a successful import
        #[arg(long)]
        no_verify: bool,
    },

    /// Spot-check the prompts stored in the backend
    Verify {
        /// Number of stored prompts to show
        #[arg(short = 'n', long, default_value = "3")]
        sample: usize,
    },
}

/// Parse arguments, load settings, and run the requested stage.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let settings = Settings::load(&config_path)?;
    let progress = progress::stage_progress(cli.quiet);

    match cli.command {
        Commands::Extract { html, output } => {
            commands::cmd_extract(&settings, html.as_deref(), output.as_deref(), progress).await
        }
        Commands::Upload { input, output } => {
            commands::cmd_upload(&settings, input.as_deref(), output.as_deref(), progress).await
        }
        Commands::Import {
            input,
            batch_size,
            dry_run,
            no_verify,
        } => {
            commands::cmd_import(
                &settings,
                input.as_deref(),
                batch_size,
                dry_run,
                !no_verify,
            )
            .await
        }
        Commands::Verify { sample } => commands::cmd_verify(&settings, sample).await,
    }
}
