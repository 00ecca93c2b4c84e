pub mod widgets;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

#[allow(clippy::cast_possible_truncation)]
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Documents panel: borders + path entry + one row per file, plus a gauge
    // row while an upload is running. Capped so the transcript keeps room.
    let file_rows = app.files.len().max(1);
    let gauge_rows = usize::from(app.upload_percent().is_some());
    let wanted_docs = 3 + file_rows + gauge_rows;
    let max_docs = (area.height as usize / 3).max(5);
    let docs_height = wanted_docs.min(max_docs) as u16;

    // The question input grows with its content, clamped to half the screen.
    let available_width = (area.width.saturating_sub(2) as usize).max(1);
    let input_lines = if app.input_buffer.is_empty() {
        1
    } else {
        app.input_buffer.chars().count().div_ceil(available_width)
    };
    let max_input_lines = (area.height as usize / 2).saturating_sub(2).max(1);
    let input_height = (input_lines.clamp(1, max_input_lines) + 2) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(docs_height),  // Documents panel
            Constraint::Min(0),               // Transcript
            Constraint::Length(1),            // Status line
            Constraint::Length(input_height), // Question input
            Constraint::Length(1),            // Bottom keymap bar
        ])
        .split(area);

    widgets::render_documents(frame, app, chunks[0]);
    widgets::render_transcript(frame, app, chunks[1]);
    widgets::render_status_bar(frame, app, chunks[2]);
    widgets::render_question_input(frame, app, chunks[3]);
    widgets::render_bottom_bar(frame, app, chunks[4]);

    widgets::render_toasts(frame, app, area);

    if app.show_help {
        widgets::render_help_window(frame, area);
    }
}
