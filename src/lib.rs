pub mod error;
pub mod models;
pub mod publishers;
pub mod services;
pub mod traits;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use crate::error::{UploadError, UploadResult};
use crate::models::config::UploaderConfig;
use crate::models::types::UploadReport;
use crate::publishers::{BotApiClient, ConsoleTelegramApi};
use crate::services::session::strategy_for;
use crate::services::settings::{load_settings, FileSettings};
use crate::services::uploader::Uploader;
use crate::traits::telegram_api::TelegramApi;

/// tg-upload - отправка артефактов сборки в Telegram чат или тему
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional YAML settings file; environment variables override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print what would be sent without contacting Telegram
    #[arg(long)]
    pub dry_run: bool,

    /// Files to send as one grouped message
    pub files: Vec<PathBuf>,
}

/// Initialize structured logging (default to info if RUST_LOG not set)
pub fn init_logging() {
    let log_spec = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_spec))
        .with_target(false)
        .compact()
        .try_init();
}

/// High-level entrypoint over the process environment.
pub async fn run(cli: Cli) -> UploadResult<UploadReport> {
    run_with_env(cli, |key| std::env::var(key).ok()).await
}

/// Same as [`run`] but reads variables through `lookup`.
pub async fn run_with_env<F>(cli: Cli, lookup: F) -> UploadResult<UploadReport>
where
    F: Fn(&str) -> Option<String>,
{
    if cli.files.is_empty() {
        return Err(UploadError::NoFiles);
    }

    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => FileSettings::default(),
    };
    let config = UploaderConfig::resolve(lookup, &settings)?;

    let api: Arc<dyn TelegramApi> = if cli.dry_run {
        Arc::new(ConsoleTelegramApi)
    } else {
        Arc::new(BotApiClient::with_timeout(config.api_base_url.clone(), config.request_timeout)?)
    };
    let uploader = Uploader::builder()
        .api(api)
        .strategy(strategy_for(&config))
        .build();

    uploader.upload(config, &cli.files).await
}

/// Maps the outcome of a run to the process exit status, reporting it on the way.
pub fn finish(result: &UploadResult<UploadReport>) -> ExitCode {
    match result {
        Ok(report) => {
            info!(chat_id = %report.chat_id, files = report.files, messages = report.messages.len(), "upload finished");
            println!("[+] Files sent successfully.");
            ExitCode::SUCCESS
        }
        Err(UploadError::NoFiles) => {
            eprintln!("[-] {}", UploadError::NoFiles);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, config = e.is_config_error(), "upload failed");
            eprintln!("[-] An error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}
