use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use bon::Builder;
use tracing::{info, warn};

use crate::error::{UploadError, UploadResult};
use crate::models::config::{CredentialSource, UploaderConfig};
use crate::models::types::Session;
use crate::traits::session_strategy::SessionStrategy;
use crate::traits::telegram_api::TelegramApi;

/// Picks the strategy matching the configured credential source.
pub fn strategy_for(config: &UploaderConfig) -> Arc<dyn SessionStrategy> {
    let api_id = config.api_id;
    match &config.credentials {
        CredentialSource::BotToken { token } => Arc::new(
            BotTokenLogin::builder().token(token.clone()).maybe_api_id(api_id).build(),
        ),
        CredentialSource::StringSession { secret, token } => Arc::new(
            StringSession::builder()
                .secret(secret.clone())
                .maybe_token_override(token.clone())
                .maybe_api_id(api_id)
                .build(),
        ),
        CredentialSource::SessionFile { path, token } => Arc::new(
            FileSession::builder()
                .path(path.clone())
                .maybe_token(token.clone())
                .maybe_api_id(api_id)
                .build(),
        ),
    }
}

/// Fresh login: verify the token with `getMe`.
#[derive(Builder)]
pub struct BotTokenLogin {
    token: String,
    api_id: Option<i32>,
}

#[async_trait]
impl SessionStrategy for BotTokenLogin {
    fn name(&self) -> &str { "bot-token" }

    async fn authorize(&self, api: &dyn TelegramApi) -> UploadResult<Session> {
        login(api, &self.token, self.api_id).await
    }
}

async fn login(api: &dyn TelegramApi, token: &str, api_id: Option<i32>) -> UploadResult<Session> {
    let bot = api.get_me(token).await?;
    if !bot.is_bot {
        return Err(UploadError::Auth("token does not belong to a bot account".to_string()));
    }
    info!(bot_id = bot.id, username = ?bot.username, "bot authorized");
    Ok(Session::builder()
        .api_base_url(api.base_url().to_string())
        .bot_token(token.to_string())
        .bot(bot)
        .maybe_api_id(api_id)
        .build())
}

/// Checks a stored session against the configured token and application id.
fn check_session(session: &Session, token: Option<&str>, api_id: Option<i32>) -> UploadResult<()> {
    if let Some(token) = token {
        if token != session.bot_token {
            return Err(UploadError::InvalidSession("session belongs to a different bot token".to_string()));
        }
    }
    if let (Some(expected), Some(bound)) = (api_id, session.api_id) {
        if expected != bound {
            return Err(UploadError::InvalidSession(format!(
                "session is bound to API_ID {}, configured {}",
                bound, expected
            )));
        }
    }
    Ok(())
}

/// Serializes a session into a `BOT_CI_SESSION` secret.
pub fn encode_session(session: &Session) -> UploadResult<String> {
    let json = serde_json::to_vec(session)
        .map_err(|e| UploadError::InvalidSession(format!("failed to serialize session: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_session(secret: &str) -> UploadResult<Session> {
    let raw = URL_SAFE_NO_PAD
        .decode(secret.trim().trim_end_matches('='))
        .map_err(|e| UploadError::InvalidSession(format!("not valid base64: {}", e)))?;
    serde_json::from_slice(&raw).map_err(|e| UploadError::InvalidSession(format!("malformed session: {}", e)))
}

/// Pre-authorized session handed in as a secret (`BOT_CI_SESSION`); no `getMe` round-trip.
#[derive(Builder)]
pub struct StringSession {
    secret: String,
    token_override: Option<String>,
    api_id: Option<i32>,
}

#[async_trait]
impl SessionStrategy for StringSession {
    fn name(&self) -> &str { "string-session" }

    async fn authorize(&self, api: &dyn TelegramApi) -> UploadResult<Session> {
        let session = decode_session(&self.secret)?;
        check_session(&session, self.token_override.as_deref(), self.api_id)?;
        if session.api_base_url != api.base_url() {
            warn!(session_base = %session.api_base_url, api_base = %api.base_url(), "session was created against another API endpoint");
        }
        info!(bot_id = session.bot.id, "using pre-authorized session");
        Ok(session)
    }
}

/// Session persisted on disk: reused when it still matches, recreated otherwise.
#[derive(Builder)]
pub struct FileSession {
    path: PathBuf,
    token: Option<String>,
    api_id: Option<i32>,
}

impl FileSession {
    fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }
        let loaded = fs::read_to_string(&self.path)
            .map_err(UploadError::from)
            .and_then(|data| {
                serde_yaml::from_str::<Session>(&data)
                    .map_err(|e| UploadError::InvalidSession(e.to_string()))
            })
            .and_then(|s| check_session(&s, self.token.as_deref(), self.api_id).map(|_| s));
        match loaded {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring stored session");
                None
            }
        }
    }
}

pub fn save_session(path: &Path, session: &Session) -> UploadResult<()> {
    let serialized = serde_yaml::to_string(session)
        .map_err(|e| UploadError::InvalidSession(format!("failed to serialize session: {}", e)))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // mode only applies on creation; an older file may still be world-readable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

#[async_trait]
impl SessionStrategy for FileSession {
    fn name(&self) -> &str { "session-file" }

    async fn authorize(&self, api: &dyn TelegramApi) -> UploadResult<Session> {
        if let Some(session) = self.load() {
            info!(path = %self.path.display(), bot_id = session.bot.id, "reusing stored session");
            return Ok(session);
        }
        let token = self.token.as_deref().ok_or(UploadError::MissingCredential("BOT_TOKEN"))?;
        let session = login(api, token, self.api_id).await?;
        save_session(&self.path, &session)?;
        info!(path = %self.path.display(), "session stored");
        Ok(session)
    }
}
