use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use bon::Builder;
use tracing::{debug, error, info};

use crate::error::{UploadError, UploadResult};
use crate::models::types::{Attachment, BotIdentity, Session, SentMessage, UploadRequest};
use crate::traits::telegram_api::TelegramApi;

/// Bot API refuses media groups with more than this many items.
pub const MAX_ALBUM_SIZE: usize = 10;

/// A real implementation of the `TelegramApi` trait that sends HTTP requests to the Telegram Bot API.
#[derive(Builder)]
pub struct BotApiClient {
    #[builder(default = Client::new())]
    client: Client,
    #[builder(into)]
    base_url: String,
}

impl BotApiClient {
    /// Client with a per-request timeout; uploads of large artifacts need a generous one.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> UploadResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(UploadError::Transport)?;
        Ok(Self::builder().client(client).base_url(base_url).build())
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url.trim_end_matches('/'), token, method)
    }

    async fn call<T: DeserializeOwned>(&self, token: &str, method: &str, form: Option<Form>) -> UploadResult<T> {
        let url = self.method_url(token, method);
        let request = match form {
            Some(form) => self.client.post(&url).multipart(form),
            None => self.client.get(&url),
        };

        // reqwest errors carry the URL, which carries the token
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, method, "HTTP error calling Telegram");
            UploadError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| UploadError::Transport(e.without_url()))?;
        debug!(method, status = %status, body_len = body.len(), "telegram response");

        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(ApiResponse { ok: true, result: Some(result), .. }) if status.is_success() => Ok(result),
            Ok(parsed) => Err(UploadError::Api {
                code: parsed.error_code.unwrap_or(i64::from(status.as_u16())),
                description: parsed.description.unwrap_or_else(|| "request was not successful".to_string()),
            }),
            Err(_) => Err(UploadError::Api {
                code: i64::from(status.as_u16()),
                description: body,
            }),
        }
    }

    async fn file_part(attachment: &Attachment) -> UploadResult<Part> {
        let bytes = tokio::fs::read(attachment.path()).await?;
        Ok(Part::bytes(bytes)
            .file_name(attachment.file_name().to_string())
            .mime_str("application/octet-stream")?)
    }

    fn base_form(request: &UploadRequest) -> Form {
        let mut form = Form::new().text("chat_id", request.chat_id.to_string());
        if let Some(thread_id) = request.thread_id {
            form = form.text("message_thread_id", thread_id.to_string());
        }
        form
    }

    async fn send_document(
        &self,
        token: &str,
        request: &UploadRequest,
        attachment: &Attachment,
        caption: Option<&str>,
    ) -> UploadResult<SentMessage> {
        let mut form = Self::base_form(request).part("document", Self::file_part(attachment).await?);
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string()).text("parse_mode", PARSE_MODE);
        }
        info!(file = attachment.file_name(), size = attachment.size(), "sendDocument");
        self.call(token, "sendDocument", Some(form)).await
    }

    async fn send_media_group(
        &self,
        token: &str,
        request: &UploadRequest,
        album: &[Attachment],
        caption: Option<&str>,
    ) -> UploadResult<Vec<SentMessage>> {
        let last = album.len() - 1;
        let media: Vec<InputMediaDocument> = (0..album.len())
            .map(|i| InputMediaDocument {
                kind: "document",
                media: format!("attach://file{}", i),
                caption: caption.filter(|_| i == last).map(str::to_string),
                parse_mode: caption.filter(|_| i == last).map(|_| PARSE_MODE),
            })
            .collect();
        let media = serde_json::to_string(&media)
            .map_err(|e| UploadError::Settings(format!("failed to encode media group: {}", e)))?;

        let mut form = Self::base_form(request).text("media", media);
        for (i, attachment) in album.iter().enumerate() {
            form = form.part(format!("file{}", i), Self::file_part(attachment).await?);
        }
        info!(files = album.len(), "sendMediaGroup");
        self.call(token, "sendMediaGroup", Some(form)).await
    }
}

const PARSE_MODE: &str = "MarkdownV2";

#[async_trait]
impl TelegramApi for BotApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_me(&self, token: &str) -> UploadResult<BotIdentity> {
        self.call(token, "getMe", None).await.map_err(|e| match e {
            UploadError::Api { code, description } => UploadError::Auth(format!("{}: {}", code, description)),
            other => other,
        })
    }

    /// Sends the request as a media group, or as a plain document when it holds
    /// a single file. More than [`MAX_ALBUM_SIZE`] files go out as consecutive
    /// albums; the caption is attached to the very last file. Albums are not
    /// transactional: if a later album fails, the earlier ones stay delivered.
    async fn send_files(&self, session: &Session, request: &UploadRequest) -> UploadResult<Vec<SentMessage>> {
        let albums: Vec<&[Attachment]> = request.attachments.chunks(MAX_ALBUM_SIZE).collect();
        let mut sent = Vec::with_capacity(request.len());
        for (n, album) in albums.iter().enumerate() {
            let caption = request.caption.as_deref().filter(|_| n + 1 == albums.len());
            if album.len() == 1 {
                sent.push(self.send_document(&session.bot_token, request, &album[0], caption).await?);
            } else {
                sent.extend(self.send_media_group(&session.bot_token, request, album, caption).await?);
            }
        }
        Ok(sent)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct InputMediaDocument {
    #[serde(rename = "type")]
    kind: &'static str,
    media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}
