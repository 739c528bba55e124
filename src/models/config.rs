use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use strum::Display as StrumDisplay;
use tracing::{info, warn};
use url::Url;

use crate::error::{UploadError, UploadResult};
use crate::models::types::{ChatId, ThreadId};
use crate::publishers::utils::build_caption;
use crate::services::settings::FileSettings;

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// How the bot session is obtained.
#[derive(Clone, PartialEq, Eq, StrumDisplay)]
pub enum CredentialSource {
    /// Fresh login with the bot token.
    #[strum(serialize = "bot-token")]
    BotToken { token: String },
    /// Pre-authorized session secret (`BOT_CI_SESSION`).
    #[strum(serialize = "string-session")]
    StringSession { secret: String, token: Option<String> },
    /// Session persisted on disk between runs.
    #[strum(serialize = "session-file")]
    SessionFile { path: PathBuf, token: Option<String> },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionFile { path, .. } => write!(f, "SessionFile({})", path.display()),
            other => write!(f, "{}", other),
        }
    }
}

/// Everything one run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub chat_id: ChatId,
    pub thread_id: Option<ThreadId>,
    /// `API_ID`; sessions are bound to it.
    pub api_id: Option<i32>,
    pub credentials: CredentialSource,
    pub caption: Option<String>,
}

impl UploaderConfig {
    /// Resolves configuration from `lookup` (environment-like) on top of `settings`.
    ///
    /// Nothing here touches the network. An invalid `CHAT_ID` is fatal; an
    /// invalid `MESSAGE_THREAD_ID` only drops topic scoping.
    pub fn resolve<F>(lookup: F, settings: &FileSettings) -> UploadResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let chat_id = match var("CHAT_ID") {
            Some(raw) => raw
                .parse::<ChatId>()
                .map_err(|_| UploadError::InvalidChatId(raw.clone()))?,
            None => settings
                .chat_id
                .map(ChatId::from)
                .ok_or_else(|| UploadError::InvalidChatId("<unset>".to_string()))?,
        };

        let thread_id = match var("MESSAGE_THREAD_ID") {
            Some(raw) => match raw.parse::<ThreadId>() {
                Ok(id) => {
                    info!(thread_id = %id, "targeting topic");
                    Some(id)
                }
                Err(_) => {
                    warn!(value = %raw, "invalid MESSAGE_THREAD_ID, sending to main chat instead");
                    None
                }
            },
            None => settings.message_thread_id.map(ThreadId::from),
        };

        let api_id = match var("API_ID") {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| UploadError::InvalidApiId(raw.clone()))?),
            None => settings.api_id,
        };
        // the hash only has to accompany the id; Bot API calls never send it
        let has_api_hash = var("API_HASH").is_some() || settings.api_hash.as_deref().is_some_and(|h| !h.trim().is_empty());
        if api_id.is_some() && !has_api_hash {
            return Err(UploadError::MissingCredential("API_HASH"));
        }

        let token = var("BOT_TOKEN").or_else(|| settings.bot_token.clone());
        let session_file = var("BOT_SESSION_FILE").or_else(|| settings.session_file.clone());
        let credentials = if let Some(secret) = var("BOT_CI_SESSION") {
            CredentialSource::StringSession { secret, token }
        } else if let Some(path) = session_file {
            CredentialSource::SessionFile { path: PathBuf::from(path), token }
        } else {
            let token = token.ok_or(UploadError::MissingCredential("BOT_TOKEN"))?;
            CredentialSource::BotToken { token }
        };

        let base = var("TELEGRAM_API_BASE_URL")
            .or_else(|| settings.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Url::parse(&base).map_err(|e| UploadError::Settings(format!("invalid API base URL {}: {}", base, e)))?;
        let api_base_url = base.trim_end_matches('/').to_string();

        let timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| UploadError::Settings(format!("invalid REQUEST_TIMEOUT_SECS: {}", raw)))?,
            None => settings.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let caption = build_caption(var("COMMIT_MESSAGE").as_deref(), var("COMMIT_URL").as_deref());

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            chat_id,
            thread_id,
            api_id,
            credentials,
            caption,
        })
    }
}
