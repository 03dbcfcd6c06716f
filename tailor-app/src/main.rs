use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tailor_common::observability::init_logging;
use tailor_config::{TailorConfig, TailorConfigLoader};
use wiring::{build_from_config, log_config};

mod handlers;
mod wiring;

/// Extract job descriptions from posting URLs and keep them for later matching.
#[derive(Debug, Parser)]
#[command(name = "tailor", version)]
struct Cli {
    /// YAML config file; a missing file falls back to env and defaults.
    #[arg(long, env = "TAILOR_CONFIG", default_value = "tailor.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch a job posting and store its description.
    FromUrl {
        url: String,
        #[arg(long)]
        resume_id: Option<String>,
    },
    /// Store one or more pasted job descriptions.
    Upload {
        job_descriptions: Vec<String>,
        #[arg(long)]
        resume_id: Option<String>,
    },
    /// Print a stored job.
    Show { job_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Env wins over the file.
    let cfg: TailorConfig = TailorConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(config = %cli.config.display(), log_path = %log_path.display(), "app.start");

    let handlers = build_from_config(&cfg).await?;

    match cli.command {
        Command::FromUrl { url, resume_id } => {
            print_json(&handlers.from_url(&url, resume_id.as_deref()).await?)
        }
        Command::Upload {
            job_descriptions,
            resume_id,
        } => print_json(
            &handlers
                .upload(&job_descriptions, resume_id.as_deref())
                .await?,
        ),
        Command::Show { job_id } => print_json(&handlers.show(&job_id).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
