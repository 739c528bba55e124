use serde::{Serialize, Deserialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use derive_more::{From, Into, Display, FromStr};
use bon::{bon, Builder};

use crate::error::{UploadError, UploadResult};

/// Идентификатор чата назначения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into, Display, FromStr)]
pub struct ChatId(i64);

impl ChatId {
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Идентификатор темы (forum topic) внутри чата
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into, Display, FromStr)]
pub struct ThreadId(i64);

impl ThreadId {
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Локальный файл, подготовленный к отправке
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    file_name: String,
    size: u64,
}

#[bon]
impl Attachment {
    /// Checks that `path` is an existing, readable regular file.
    #[builder]
    pub fn new(path: PathBuf) -> UploadResult<Self> {
        let not_found = || UploadError::FileNotFound { path: path.clone() };
        let meta = std::fs::metadata(&path).map_err(|_| not_found())?;
        if !meta.is_file() {
            return Err(not_found());
        }
        File::open(&path).map_err(|_| not_found())?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self { path, file_name, size: meta.len() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// One grouped send: destination, optional topic, ordered files, optional caption.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub chat_id: ChatId,
    pub thread_id: Option<ThreadId>,
    pub attachments: Vec<Attachment>,
    pub caption: Option<String>,
}

impl UploadRequest {
    /// Builds attachments in argument order; fails on the first bad path.
    pub fn from_paths(
        chat_id: ChatId,
        thread_id: Option<ThreadId>,
        paths: &[PathBuf],
        caption: Option<String>,
    ) -> UploadResult<Self> {
        if paths.is_empty() {
            return Err(UploadError::NoFiles);
        }
        let attachments = paths
            .iter()
            .map(|p| Attachment::builder().path(p.clone()).build())
            .collect::<UploadResult<Vec<_>>>()?;

        Ok(Self { chat_id, thread_id, attachments, caption })
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

/// Result of `getMe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

/// An authorized bot session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Session {
    pub api_base_url: String,
    pub bot_token: String,
    pub bot: BotIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<i32>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("api_base_url", &self.api_base_url)
            .field("bot_token", &"<redacted>")
            .field("bot", &self.bot)
            .field("api_id", &self.api_id)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// What a successful run reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub chat_id: ChatId,
    pub thread_id: Option<ThreadId>,
    pub files: usize,
    pub messages: Vec<SentMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn chat_id_parses_negative_supergroup_ids() {
        let id: ChatId = "-1001234567890".parse().unwrap();
        assert_eq!(id.get(), -1001234567890);
        assert!("abc".parse::<ChatId>().is_err());
    }

    #[test]
    fn attachment_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.apk");
        assert!(matches!(
            Attachment::builder().path(missing).build(),
            Err(UploadError::FileNotFound { .. })
        ));
        assert!(Attachment::builder().path(dir.path().to_path_buf()).build().is_err());
    }

    #[test]
    fn request_keeps_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for name in ["b.apk", "a.apk", "c.apk"] {
            let p = dir.path().join(name);
            File::create(&p).unwrap().write_all(b"apk").unwrap();
            paths.push(p);
        }
        let req = UploadRequest::from_paths(ChatId::from(1), None, &paths, None).unwrap();
        let names: Vec<_> = req.attachments.iter().map(|a| a.file_name()).collect();
        assert_eq!(names, ["b.apk", "a.apk", "c.apk"]);
        assert_eq!(req.attachments[0].size(), 3);
    }

    #[test]
    fn request_requires_files() {
        assert!(matches!(
            UploadRequest::from_paths(ChatId::from(1), None, &[], None),
            Err(UploadError::NoFiles)
        ));
    }

    #[test]
    fn session_debug_hides_token() {
        let s = Session::builder()
            .api_base_url("https://api.telegram.org".to_string())
            .bot_token("123:SECRET".to_string())
            .bot(BotIdentity { id: 123, username: None, is_bot: true })
            .build();
        assert!(!format!("{:?}", s).contains("SECRET"));
    }
}
