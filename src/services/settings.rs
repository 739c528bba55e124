use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{UploadError, UploadResult};

/// Optional YAML settings file. Every field may be overridden by the
/// matching environment variable.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FileSettings {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub bot_token: Option<String>,
    pub chat_id: Option<i64>,
    pub message_thread_id: Option<i64>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub session_file: Option<String>,
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> UploadResult<FileSettings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| UploadError::Settings(format!("failed to read {}: {}", path.display(), e)))?;
    let settings: FileSettings = serde_yaml::from_str(&content)
        .map_err(|e| UploadError::Settings(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(settings)
}
