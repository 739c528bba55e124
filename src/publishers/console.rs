use async_trait::async_trait;

use crate::error::UploadResult;
use crate::models::types::{BotIdentity, Session, SentMessage, UploadRequest};
use crate::traits::telegram_api::TelegramApi;

/// Prints what would be sent instead of talking to Telegram (`--dry-run`).
pub struct ConsoleTelegramApi;

impl ConsoleTelegramApi {
    pub fn render_plan(request: &UploadRequest) -> Vec<String> {
        let mut lines = Vec::with_capacity(request.len() + 2);
        match request.thread_id {
            Some(thread) => lines.push(format!("[dry-run] chat {} topic {}", request.chat_id, thread)),
            None => lines.push(format!("[dry-run] chat {}", request.chat_id)),
        }
        for a in &request.attachments {
            lines.push(format!("[dry-run]   {} ({} bytes)", a.path().display(), a.size()));
        }
        if let Some(caption) = &request.caption {
            lines.push(format!("[dry-run] caption: {}", caption));
        }
        lines
    }
}

#[async_trait]
impl TelegramApi for ConsoleTelegramApi {
    fn base_url(&self) -> &str {
        "dry-run"
    }

    async fn get_me(&self, _token: &str) -> UploadResult<BotIdentity> {
        Ok(BotIdentity { id: 0, username: Some("dry_run_bot".to_string()), is_bot: true })
    }

    async fn send_files(&self, _session: &Session, request: &UploadRequest) -> UploadResult<Vec<SentMessage>> {
        for line in Self::render_plan(request) {
            println!("{}", line);
        }
        tracing::info!(files = request.len(), "console telegram output");
        Ok(Vec::new())
    }
}
