// HTTP client for the document question-answering service

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{SelectedFile, UploadMode};

/// Upload bodies are streamed in chunks this size so progress callbacks fire
/// at a useful rate even for a single large file.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Callback invoked with 0-100 as upload bytes are handed to the transport.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not read {name}: {source}")]
    File {
        name: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct RagClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

impl RagClient {
    pub fn new(base_url: String, request_timeout: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    const fn upload_endpoint(mode: UploadMode) -> &'static str {
        match mode {
            UploadMode::Single => "/upload_pdf/",
            UploadMode::Multiple => "/upload_pdfs/",
        }
    }

    const fn upload_field(mode: UploadMode) -> &'static str {
        match mode {
            UploadMode::Single => "file",
            UploadMode::Multiple => "files",
        }
    }

    /// Upload the staged files as one multipart request, one part per file.
    /// `on_progress` sees a monotonically non-decreasing percent across the
    /// whole request, ending at 100 once the server has accepted it.
    pub async fn upload(
        &self,
        mode: UploadMode,
        files: &[SelectedFile],
        on_progress: ProgressFn,
    ) -> Result<UploadResponse, ApiError> {
        let mut payloads = Vec::with_capacity(files.len());
        let mut total: u64 = 0;
        for file in files {
            let bytes =
                tokio::fs::read(&file.path)
                    .await
                    .map_err(|source| ApiError::File {
                        name: file.name.clone(),
                        source,
                    })?;
            total += bytes.len() as u64;
            payloads.push((file.name.clone(), bytes));
        }

        on_progress(0);
        let sent = Arc::new(AtomicU64::new(0));
        let field = Self::upload_field(mode);
        let mut form = Form::new();
        for (name, bytes) in payloads {
            let length = bytes.len() as u64;
            let body = progress_body(bytes, total, sent.clone(), on_progress.clone());
            let part = Part::stream_with_length(body, length)
                .file_name(name)
                .mime_str("application/pdf")?;
            form = form.part(field, part);
        }

        let url = format!("{}{}", self.base_url, Self::upload_endpoint(mode));
        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let parsed = response.json::<UploadResponse>().await?;
        on_progress(100);
        Ok(parsed)
    }

    /// Ask one question against the uploaded documents.
    pub async fn query(&self, question: &str) -> Result<QueryResponse, ApiError> {
        let url = format!("{}/query/", self.base_url);
        let request = QueryRequest {
            query: question.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response.json::<QueryResponse>().await?)
    }
}

/// Wrap file bytes in a chunked stream that advances the shared byte counter
/// and reports percent as the transport consumes it.
fn progress_body(
    bytes: Vec<u8>,
    total: u64,
    sent: Arc<AtomicU64>,
    on_progress: ProgressFn,
) -> Body {
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let stream = stream::iter(chunks.into_iter().map(move |chunk| {
        let sent_now = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        #[allow(clippy::cast_possible_truncation)]
        let percent = if total == 0 {
            100
        } else {
            (sent_now.saturating_mul(100) / total).min(100) as u8
        };
        on_progress(percent);
        Ok::<Vec<u8>, std::io::Error>(chunk)
    }));
    Body::wrap_stream(stream)
}
