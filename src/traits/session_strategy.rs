use async_trait::async_trait;

use crate::error::UploadResult;
use crate::models::types::Session;
use crate::traits::telegram_api::TelegramApi;

/// How a run obtains its authorized bot session.
#[async_trait]
pub trait SessionStrategy: Send + Sync {
    fn name(&self) -> &str;
    async fn authorize(&self, api: &dyn TelegramApi) -> UploadResult<Session>;
}
