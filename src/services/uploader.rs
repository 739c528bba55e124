use std::path::PathBuf;
use std::sync::Arc;

use bon::Builder;
use tracing::info;

use crate::error::{UploadError, UploadResult};
use crate::models::config::UploaderConfig;
use crate::models::types::{UploadReport, UploadRequest};
use crate::traits::session_strategy::SessionStrategy;
use crate::traits::telegram_api::TelegramApi;

/// Authorizes a bot session and sends a batch of files as one grouped message.
#[derive(Builder)]
pub struct Uploader {
    pub(crate) api: Arc<dyn TelegramApi>,
    pub(crate) strategy: Arc<dyn SessionStrategy>,
}

impl Uploader {
    /// Runs one upload. Files are validated before any request is made and
    /// `send_files` is called once; any failure fails the whole call. Up to
    /// ten files this is all-or-nothing, past that see `BotApiClient::send_files`.
    pub async fn upload(&self, config: UploaderConfig, files: &[PathBuf]) -> UploadResult<UploadReport> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        info!(files = ?files, "found files to upload");

        let request = UploadRequest::from_paths(config.chat_id, config.thread_id, files, config.caption)?;

        let session = self.strategy.authorize(self.api.as_ref()).await?;
        info!(strategy = self.strategy.name(), bot_id = session.bot.id, "session established");

        info!(chat_id = %request.chat_id, thread_id = ?request.thread_id.map(|t| t.get()), files = request.len(), "sending files as a group");
        let messages = self.api.send_files(&session, &request).await?;

        Ok(UploadReport {
            chat_id: request.chat_id,
            thread_id: request.thread_id,
            files: request.len(),
            messages,
        })
    }
}
