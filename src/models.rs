use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One question/answer exchange, appended to the transcript in submission
/// order and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
}

impl TranscriptEntry {
    pub const fn new(question: String, answer: String) -> Self {
        Self { question, answer }
    }
}

/// A file the user has staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Display name, also the multipart filename sent to the server.
    pub name: String,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path.file_name().map_or_else(
            || path.to_string_lossy().into_owned(),
            |n| n.to_string_lossy().into_owned(),
        );
        Self { name, path }
    }

    /// Whether the path looks like a PDF by extension (case-insensitive).
    pub fn is_pdf(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

/// Whether the server takes one document per upload or a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    Single,
    Multiple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: String,
    #[serde(default = "default_upload_mode")]
    pub upload_mode: UploadMode,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    #[serde(default)]
    pub theme: ThemeConfig,
}

const fn default_upload_mode() -> UploadMode {
    UploadMode::Multiple
}

const fn default_timeout() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            upload_mode: default_upload_mode(),
            request_timeout: default_timeout(),
            theme: ThemeConfig::default(),
        }
    }
}

#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub question_color: String,
    pub answer_color: String,
    pub border_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            question_color: "cyan".to_string(),
            answer_color: "green".to_string(),
            border_color: "cyan".to_string(),
        }
    }
}
