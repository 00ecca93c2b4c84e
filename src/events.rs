// Event types for async communication

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Upload progress in percent, 0-100
    UploadProgress(u8),
    /// Upload completed, carries the server's confirmation message
    UploadFinished(String),
    /// Upload failed, carries the error detail for the log
    UploadFailed(String),
    /// The server answered a question
    QueryAnswered { question: String, answer: String },
    /// Query failed, carries the error detail for the log
    QueryFailed(String),
}
