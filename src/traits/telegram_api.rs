use async_trait::async_trait;

use crate::error::UploadResult;
use crate::models::types::{BotIdentity, Session, SentMessage, UploadRequest};

/// `TelegramApi` is the seam to the messaging backend.
///
/// The real implementation talks to the Bot API over HTTP; tests and
/// `--dry-run` plug in their own.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Base URL sessions created through this API are bound to.
    fn base_url(&self) -> &str;

    /// Verifies `token` and returns the bot behind it.
    async fn get_me(&self, token: &str) -> UploadResult<BotIdentity>;

    /// Sends every attachment of `request` as one grouped message.
    async fn send_files(&self, session: &Session, request: &UploadRequest) -> UploadResult<Vec<SentMessage>>;
}
