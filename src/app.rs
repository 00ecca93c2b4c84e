use std::path::PathBuf;
use std::time::Instant;

use crate::models::{AppConfig, SelectedFile, ThemeConfig, TranscriptEntry, UploadMode};
use crate::notify::Notifications;

/// Which pane receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Files,
    Question,
}

/// Upload lifecycle. Percent only moves forward within a single attempt and
/// starts over at 0 on the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    InProgress { percent: u8 },
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub exit_pending: bool,
    pub show_help: bool,
    pub focus: Focus,
    pub upload_mode: UploadMode,
    pub server_url: String,
    pub theme: ThemeConfig,

    pub files: Vec<SelectedFile>,
    pub file_cursor: usize,
    pub path_buffer: String,
    pub upload: UploadState,

    pub input_buffer: String,
    pub query: QueryState,
    pub transcript: Vec<TranscriptEntry>,
    pub scroll_offset: usize,

    pub notifications: Notifications,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            should_quit: false,
            exit_pending: false,
            show_help: false,
            focus: Focus::Files,
            upload_mode: config.upload_mode,
            server_url: config.server_url.clone(),
            theme: config.theme.clone(),
            files: Vec::new(),
            file_cursor: 0,
            path_buffer: String::new(),
            upload: UploadState::Idle,
            input_buffer: String::new(),
            query: QueryState::default(),
            transcript: Vec::new(),
            scroll_offset: 0,
            notifications: Notifications::default(),
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub const fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Files => Focus::Question,
            Focus::Question => Focus::Files,
        };
    }

    /// Housekeeping run once per frame.
    pub fn tick(&mut self) {
        self.notifications.prune(Instant::now());
    }

    // --- File selection ----------------------------------------------------

    /// Stage a file for upload. In single mode the new file replaces the
    /// whole set; in multiple mode it extends it. Non-PDF paths are rejected
    /// with a notification.
    pub fn add_file(&mut self, path: PathBuf) -> bool {
        if !SelectedFile::is_pdf(&path) {
            let file = SelectedFile::from_path(path);
            self.notifications
                .error(format!("{} is not a PDF.", file.name));
            return false;
        }

        let file = SelectedFile::from_path(path);
        match self.upload_mode {
            UploadMode::Single => {
                self.files.clear();
                self.files.push(file);
                self.file_cursor = 0;
            }
            UploadMode::Multiple => {
                self.files.push(file);
            }
        }
        true
    }

    /// Take the typed path from the files pane and stage it.
    pub fn submit_path(&mut self) {
        let trimmed = self.path_buffer.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.add_file(PathBuf::from(trimmed)) {
            self.path_buffer.clear();
        }
    }

    /// Remove the first staged file with this display name. Relative order
    /// of the remaining files is preserved.
    pub fn remove_file(&mut self, name: &str) -> bool {
        let Some(pos) = self.files.iter().position(|f| f.name == name) else {
            return false;
        };
        self.files.remove(pos);
        self.clamp_file_cursor();
        true
    }

    /// Remove the file under the cursor in the files pane.
    pub fn remove_selected_file(&mut self) {
        if self.file_cursor < self.files.len() {
            self.files.remove(self.file_cursor);
            self.clamp_file_cursor();
        }
    }

    fn clamp_file_cursor(&mut self) {
        if self.file_cursor >= self.files.len() && self.file_cursor > 0 {
            self.file_cursor = self.files.len().saturating_sub(1);
        }
    }

    pub const fn file_cursor_up(&mut self) {
        self.file_cursor = self.file_cursor.saturating_sub(1);
    }

    pub fn file_cursor_down(&mut self) {
        if self.file_cursor + 1 < self.files.len() {
            self.file_cursor += 1;
        }
    }

    // --- Upload ------------------------------------------------------------

    /// Whether the upload action is currently available.
    pub fn can_upload(&self) -> bool {
        if self.files.is_empty() {
            return false;
        }
        if matches!(self.upload, UploadState::InProgress { .. }) {
            return false;
        }
        // A batch upload is single-shot; re-uploading one file is allowed.
        !(self.upload_mode == UploadMode::Multiple && self.upload == UploadState::Succeeded)
    }

    /// Validate and enter the in-progress state. Returns false, without any
    /// network activity, when validation fails or an upload is running.
    pub fn begin_upload(&mut self) -> bool {
        if self.files.is_empty() {
            self.notifications.error("Select at least one PDF first.");
            return false;
        }
        if !self.can_upload() {
            return false;
        }
        self.upload = UploadState::InProgress { percent: 0 };
        true
    }

    /// Apply a progress callback. Percent never moves backwards within an
    /// attempt; stale events after completion or cancellation are ignored.
    pub const fn upload_progress(&mut self, percent: u8) {
        if let UploadState::InProgress { percent: current } = self.upload {
            let capped = if percent > 100 { 100 } else { percent };
            if capped > current {
                self.upload = UploadState::InProgress { percent: capped };
            }
        }
    }

    pub fn finish_upload(&mut self, message: String) {
        self.upload = UploadState::Succeeded;
        self.notifications.success(message);
    }

    pub fn fail_upload(&mut self) {
        self.upload = UploadState::Failed;
        self.notifications.error("Upload failed. Try again.");
    }

    /// Abort the running upload, if any.
    pub fn cancel_upload(&mut self) -> bool {
        if matches!(self.upload, UploadState::InProgress { .. }) {
            self.upload = UploadState::Idle;
            self.notifications.error("Upload cancelled.");
            return true;
        }
        false
    }

    pub const fn upload_percent(&self) -> Option<u8> {
        match self.upload {
            UploadState::InProgress { percent } => Some(percent),
            _ => None,
        }
    }

    // --- Query -------------------------------------------------------------

    /// Whether asking is unlocked at all. A batch server answers only after
    /// documents were indexed; a single-document server has no such gate.
    pub fn query_unlocked(&self) -> bool {
        match self.upload_mode {
            UploadMode::Single => true,
            UploadMode::Multiple => self.upload == UploadState::Succeeded,
        }
    }

    pub fn can_query(&self) -> bool {
        self.query != QueryState::InFlight && self.query_unlocked()
    }

    /// Validate the question and enter the in-flight state. Returns the
    /// question to send, or None when nothing may be sent. The input buffer
    /// is left untouched so a failed request can be resubmitted.
    pub fn begin_query(&mut self) -> Option<String> {
        let question = self.input_buffer.trim().to_string();
        if question.is_empty() {
            self.notifications.error("Type a question first.");
            return None;
        }
        if !self.can_query() {
            return None;
        }
        self.query = QueryState::InFlight;
        Some(question)
    }

    pub fn finish_query(&mut self, question: String, answer: String) {
        self.transcript.push(TranscriptEntry::new(question, answer));
        self.query = QueryState::Succeeded;
        self.input_buffer.clear();
        self.scroll_to_bottom();
    }

    pub fn fail_query(&mut self) {
        self.query = QueryState::Failed;
        self.notifications
            .error("The question could not be answered. Try again.");
    }

    /// Abort the running query, if any. The typed question stays put.
    pub fn cancel_query(&mut self) -> bool {
        if self.query == QueryState::InFlight {
            self.query = QueryState::Idle;
            self.notifications.error("Question cancelled.");
            return true;
        }
        false
    }

    // --- Transcript scrolling ----------------------------------------------

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub const fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // The rendering code clamps this to the real maximum.
        self.scroll_offset = usize::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_mode(mode: UploadMode) -> App {
        let config = AppConfig {
            upload_mode: mode,
            ..Default::default()
        };
        App::new(&config)
    }

    fn staged(app: &mut App, names: &[&str]) {
        for name in names {
            assert!(app.add_file(PathBuf::from(format!("/docs/{name}"))));
        }
    }

    #[test]
    fn test_new_app_is_at_rest() {
        let app = app_with_mode(UploadMode::Multiple);
        assert!(!app.should_quit);
        assert_eq!(app.upload, UploadState::Idle);
        assert_eq!(app.query, QueryState::Idle);
        assert!(app.files.is_empty());
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn test_add_file_extends_in_multiple_mode() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf", "b.pdf"]);
        let names: Vec<&str> = app.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_add_file_replaces_in_single_mode() {
        let mut app = app_with_mode(UploadMode::Single);
        staged(&mut app, &["a.pdf", "b.pdf"]);
        assert_eq!(app.files.len(), 1);
        assert_eq!(app.files[0].name, "b.pdf");
    }

    #[test]
    fn test_add_file_rejects_non_pdf() {
        let mut app = app_with_mode(UploadMode::Multiple);
        assert!(!app.add_file(PathBuf::from("/docs/notes.txt")));
        assert!(app.files.is_empty());
        assert!(!app.notifications.is_empty());
    }

    #[test]
    fn test_submit_path_clears_buffer_on_success() {
        let mut app = app_with_mode(UploadMode::Multiple);
        app.path_buffer = "  /docs/a.pdf  ".to_string();
        app.submit_path();
        assert_eq!(app.files.len(), 1);
        assert!(app.path_buffer.is_empty());
    }

    #[test]
    fn test_submit_path_keeps_buffer_on_rejection() {
        let mut app = app_with_mode(UploadMode::Multiple);
        app.path_buffer = "/docs/notes.txt".to_string();
        app.submit_path();
        assert!(app.files.is_empty());
        assert_eq!(app.path_buffer, "/docs/notes.txt");
    }

    #[test]
    fn test_remove_file_preserves_order() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf", "b.pdf", "c.pdf"]);

        assert!(app.remove_file("b.pdf"));
        let names: Vec<&str> = app.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
    }

    #[test]
    fn test_remove_file_by_unknown_name() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf"]);
        assert!(!app.remove_file("missing.pdf"));
        assert_eq!(app.files.len(), 1);
    }

    #[test]
    fn test_remove_file_takes_first_duplicate_only() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf", "dup.pdf", "dup.pdf"]);
        assert!(app.remove_file("dup.pdf"));
        assert_eq!(app.files.len(), 2);
    }

    #[test]
    fn test_remove_selected_file_clamps_cursor() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf", "b.pdf"]);
        app.file_cursor = 1;
        app.remove_selected_file();
        assert_eq!(app.files.len(), 1);
        assert_eq!(app.file_cursor, 0);
    }

    #[test]
    fn test_begin_upload_with_empty_selection() {
        let mut app = app_with_mode(UploadMode::Multiple);
        assert!(!app.begin_upload());
        assert_eq!(app.upload, UploadState::Idle);
        assert_eq!(app.notifications.len(), 1);
    }

    #[test]
    fn test_begin_upload_resets_percent() {
        let mut app = app_with_mode(UploadMode::Single);
        staged(&mut app, &["a.pdf"]);

        assert!(app.begin_upload());
        app.upload_progress(80);
        app.fail_upload();

        assert!(app.begin_upload());
        assert_eq!(app.upload_percent(), Some(0));
    }

    #[test]
    fn test_upload_progress_is_monotonic() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf"]);
        assert!(app.begin_upload());

        app.upload_progress(40);
        app.upload_progress(20);
        assert_eq!(app.upload_percent(), Some(40));

        app.upload_progress(200);
        assert_eq!(app.upload_percent(), Some(100));
    }

    #[test]
    fn test_upload_progress_ignored_when_not_in_progress() {
        let mut app = app_with_mode(UploadMode::Multiple);
        app.upload_progress(50);
        assert_eq!(app.upload, UploadState::Idle);
    }

    #[test]
    fn test_no_second_upload_while_in_progress() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf"]);
        assert!(app.begin_upload());
        assert!(!app.begin_upload());
    }

    #[test]
    fn test_batch_upload_is_single_shot() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf"]);
        assert!(app.begin_upload());
        app.finish_upload("ok".to_string());
        assert!(!app.can_upload());
    }

    #[test]
    fn test_single_mode_upload_is_repeatable() {
        let mut app = app_with_mode(UploadMode::Single);
        staged(&mut app, &["a.pdf"]);
        assert!(app.begin_upload());
        app.finish_upload("ok".to_string());
        assert!(app.can_upload());
    }

    #[test]
    fn test_cancel_upload_returns_to_idle() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf"]);
        assert!(app.begin_upload());
        assert!(app.cancel_upload());
        assert_eq!(app.upload, UploadState::Idle);

        // Stale progress from the aborted task must not resurrect it
        app.upload_progress(70);
        assert_eq!(app.upload, UploadState::Idle);
    }

    #[test]
    fn test_query_gated_on_upload_in_multiple_mode() {
        let mut app = app_with_mode(UploadMode::Multiple);
        assert!(!app.query_unlocked());

        staged(&mut app, &["a.pdf"]);
        assert!(app.begin_upload());
        app.finish_upload("ok".to_string());
        assert!(app.query_unlocked());
    }

    #[test]
    fn test_query_not_gated_in_single_mode() {
        let app = app_with_mode(UploadMode::Single);
        assert!(app.query_unlocked());
    }

    #[test]
    fn test_begin_query_rejects_blank_question() {
        let mut app = app_with_mode(UploadMode::Single);
        app.input_buffer = "   ".to_string();
        assert!(app.begin_query().is_none());
        assert_eq!(app.query, QueryState::Idle);
        assert_eq!(app.notifications.len(), 1);
    }

    #[test]
    fn test_single_query_in_flight() {
        let mut app = app_with_mode(UploadMode::Single);
        app.input_buffer = "What is X?".to_string();
        assert_eq!(app.begin_query().as_deref(), Some("What is X?"));
        assert!(app.begin_query().is_none());
    }

    #[test]
    fn test_transcript_appends_in_submission_order() {
        let mut app = app_with_mode(UploadMode::Single);

        app.input_buffer = "first?".to_string();
        let q1 = app.begin_query().unwrap();
        app.finish_query(q1, "one".to_string());

        app.input_buffer = "second?".to_string();
        let q2 = app.begin_query().unwrap();
        app.finish_query(q2, "two".to_string());

        let questions: Vec<&str> = app.transcript.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["first?", "second?"]);
    }

    #[test]
    fn test_failed_query_keeps_question_for_retry() {
        let mut app = app_with_mode(UploadMode::Single);
        app.input_buffer = "What is X?".to_string();
        let _question = app.begin_query().unwrap();

        app.fail_query();
        assert_eq!(app.query, QueryState::Failed);
        assert_eq!(app.input_buffer, "What is X?");
        assert!(app.transcript.is_empty());
        assert!(app.can_query(), "ask action must be re-enabled");
    }

    #[test]
    fn test_upload_then_query_scenario() {
        let mut app = app_with_mode(UploadMode::Multiple);
        staged(&mut app, &["a.pdf", "b.pdf"]);

        assert!(app.begin_upload());
        app.upload_progress(100);
        app.finish_upload("ok".to_string());

        assert!(app.transcript.is_empty());
        assert!(app.can_query());

        app.input_buffer = "What is X?".to_string();
        let question = app.begin_query().unwrap();
        app.finish_query(question, "X is Y".to_string());

        assert_eq!(
            app.transcript,
            vec![TranscriptEntry::new(
                "What is X?".to_string(),
                "X is Y".to_string()
            )]
        );
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_toggle_focus() {
        let mut app = app_with_mode(UploadMode::Multiple);
        assert_eq!(app.focus, Focus::Files);
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Question);
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Files);
    }

    #[test]
    fn test_scroll_bounds() {
        let mut app = app_with_mode(UploadMode::Multiple);
        app.scroll_offset = 10;
        app.scroll_up(3);
        assert_eq!(app.scroll_offset, 7);
        app.scroll_up(10);
        assert_eq!(app.scroll_offset, 0);
        app.scroll_to_bottom();
        assert!(app.scroll_offset > 0);
        app.scroll_to_top();
        assert_eq!(app.scroll_offset, 0);
    }
}
