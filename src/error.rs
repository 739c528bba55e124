use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop an upload run.
///
/// Configuration variants are produced before any network activity;
/// the rest come from the session or send step.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file paths provided as arguments.")]
    NoFiles,

    #[error("Invalid CHAT_ID: {0}")]
    InvalidChatId(String),

    #[error("Invalid API_ID: {0}")]
    InvalidApiId(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("File not found or unreadable: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl UploadError {
    /// True for failures detected while resolving configuration, i.e. before
    /// any request was made.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::NoFiles
                | Self::InvalidChatId(_)
                | Self::InvalidApiId(_)
                | Self::MissingCredential(_)
                | Self::Settings(_)
        )
    }
}

pub type UploadResult<T> = Result<T, UploadError>;
