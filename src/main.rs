// src/main.rs

// Modules defined in the crate
mod api;
mod batch;
mod body;
mod config;
mod constants;
mod convert;
mod error;
mod frontmatter;
mod model;
mod output;
mod prepare;
mod sync;
mod types;
mod upload;
mod vault;

use crate::api::NotionHttpClient;
use crate::batch::{format_summary, run_batch};
use crate::config::{DatabaseTarget, SyncConfig};
use crate::constants::BATCH_REQUEST_DELAY_MS;
use crate::convert::BasicConverter;
use crate::error::AppError;
use crate::sync::{FileOutcome, NoteSyncer, VaultSyncer};
use crate::types::ApiKey;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineInput {
    /// Path to the configuration file with settings and targets
    #[arg(short, long, default_value = "vault2notion.json")]
    config: PathBuf,

    /// Abbreviation of the target database to push to
    #[arg(short, long)]
    target: String,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Push a single note to the target database
    Sync {
        /// The markdown file to push
        file: PathBuf,

        /// Copy the new page link to the clipboard
        #[arg(short = 'b', long, default_value_t = true)]
        clipboard: bool,
    },
    /// Push every markdown file in a folder, one at a time
    Batch {
        /// The folder to scan for markdown files
        folder: PathBuf,

        /// Descend into subfolders
        #[arg(short, long, default_value_t = true)]
        recursive: bool,

        /// Only push files without a stored page id for this target
        #[arg(long, default_value_t = false)]
        only_unsynced: bool,
    },
}

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("vault2notion.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Builds the authenticated HTTP client for a target.
fn http_client(target: &DatabaseTarget) -> Result<NotionHttpClient, AppError> {
    let api_key = ApiKey::new(target.api_token.clone())?;
    NotionHttpClient::new(&api_key)
}

async fn run(cli: CommandLineInput) -> Result<(), AppError> {
    let config = SyncConfig::load(&cli.config)?;
    let target = config.target(&cli.target)?;
    let converter = BasicConverter;

    match cli.command {
        Command::Sync { file, clipboard } => {
            if !target.is_configured() {
                return Err(AppError::MissingConfiguration(format!(
                    "target '{}' is missing its API token or database id",
                    target.ab_name
                )));
            }

            let client = http_client(target)?;
            let mut syncer = VaultSyncer::new(&client, &converter, target, &config.settings);
            syncer.copy_link = clipboard;

            match syncer.sync_file(&file).await? {
                FileOutcome::Skipped => {
                    println!("Skipped {}: no document text.", file.display());
                }
                FileOutcome::Completed(response) if response.is_success() => {
                    println!("✓ Synced {} to '{}'", file.display(), target.full_name);
                    if let Some(url) = response.page_url() {
                        println!(
                            "  {}",
                            upload::shareable_link(url, &config.settings.notion_user)
                        );
                    }
                }
                FileOutcome::Completed(response) => {
                    let code = response
                        .error_code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    eprintln!(
                        "✗ Sync failed with status {} ({}); check the log file for the full response.",
                        response.status, code
                    );
                    std::process::exit(1);
                }
            }
        }
        Command::Batch {
            folder,
            recursive,
            only_unsynced,
        } => {
            let mut files = vault::collect_markdown_files(&folder, recursive)?;
            if only_unsynced {
                files = vault::filter_unsynced(files, &target.ab_name);
            }
            if files.is_empty() {
                println!("No markdown files found in {}", folder.display());
                return Ok(());
            }

            println!(
                "Starting batch upload: {} file(s) from {} to '{}'",
                files.len(),
                folder.display(),
                target.full_name
            );

            // A misconfigured target yields an all-zero result without
            // touching any file.
            let client = http_client_or_log(target);
            let result = match &client {
                Some(client) => {
                    let syncer = VaultSyncer::new(client, &converter, target, &config.settings);
                    run_batch(
                        target,
                        &files,
                        &syncer,
                        Duration::from_millis(BATCH_REQUEST_DELAY_MS),
                    )
                    .await
                }
                None => batch::BatchResult::default(),
            };

            println!("{}", format_summary(&result, &folder));
            if result.failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Like [`http_client`] but demotes construction failure to a log line,
/// matching the batch path's "report, don't crash" policy.
fn http_client_or_log(target: &DatabaseTarget) -> Option<NotionHttpClient> {
    if !target.is_configured() {
        return None;
    }
    match http_client(target) {
        Ok(client) => Some(client),
        Err(e) => {
            log::error!("Could not build API client for '{}': {}", target.ab_name, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("logging setup failed: {}", e))?;

    run(cli).await?;

    Ok(())
}
