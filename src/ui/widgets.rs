use std::str::FromStr;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, QueryState, UploadState};
use crate::notify::Level;

/// Resolve a configured color name, falling back when it does not parse.
fn theme_color(name: &str, fallback: Color) -> Color {
    Color::from_str(name).unwrap_or(fallback)
}

pub fn render_documents(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Files;
    let border = theme_color(&app.theme.border_color, Color::Cyan);
    let border_style = if focused {
        Style::default().fg(border)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = match app.upload {
        UploadState::Succeeded => " Documents (uploaded) ",
        UploadState::Failed => " Documents (upload failed) ",
        _ => " Documents ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    let mut lines = Vec::new();

    let path_span = if app.path_buffer.is_empty() {
        Span::styled(
            "type a path to a PDF, then Enter",
            Style::default().fg(Color::Gray),
        )
    } else {
        Span::styled(app.path_buffer.clone(), Style::default().fg(Color::White))
    };
    lines.push(Line::from(vec![
        Span::styled("Add: ", Style::default().fg(Color::DarkGray)),
        path_span,
    ]));

    if app.files.is_empty() {
        lines.push(Line::from(Span::styled(
            "No PDFs selected.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for (index, file) in app.files.iter().enumerate() {
            let selected = focused && index == app.file_cursor;
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{marker}{}", file.name),
                style,
            )));
        }
    }

    let gauge_rows = u16::from(app.upload_percent().is_some());
    let list_area = Rect {
        height: inner.height.saturating_sub(gauge_rows),
        ..inner
    };
    frame.render_widget(Paragraph::new(lines), list_area);

    if let Some(percent) = app.upload_percent() {
        let gauge_area = Rect {
            x: inner.x,
            y: inner.y + inner.height - 1,
            width: inner.width,
            height: 1,
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .percent(u16::from(percent))
            .label(format!("{percent}%"));
        frame.render_widget(gauge, gauge_area);
    }
}

pub fn render_transcript(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.transcript.is_empty() {
        let placeholder = vec![
            Line::from(Span::styled(
                "No questions asked yet",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Upload your PDFs, then ask away",
                Style::default().fg(Color::Cyan),
            )),
        ];

        let paragraph = Paragraph::new(placeholder).alignment(Alignment::Center);

        let placeholder_height = 2;
        let y_pos = area.y + area.height.saturating_sub(placeholder_height);
        let placeholder_area = Rect {
            x: area.x,
            y: y_pos,
            width: area.width,
            height: placeholder_height.min(area.height),
        };

        frame.render_widget(paragraph, placeholder_area);
        return;
    }

    let question_color = theme_color(&app.theme.question_color, Color::Cyan);
    let answer_color = theme_color(&app.theme.answer_color, Color::Green);

    let mut lines = Vec::new();
    for entry in &app.transcript {
        push_exchange(&mut lines, "## You", question_color, &entry.question);
        push_exchange(&mut lines, "## Assistant", answer_color, &entry.answer);
    }

    if app.query == QueryState::InFlight {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Account for wrapping so scroll-to-bottom lands on the real bottom.
    let available_width = (area.width as usize).max(1);
    let mut total_visual_lines = 0;
    for line in &lines {
        let line_width = line.width();
        if line_width == 0 {
            total_visual_lines += 1;
        } else {
            total_visual_lines += line_width.div_ceil(available_width);
        }
    }

    let visible_height = area.height as usize;
    let max_scroll = total_visual_lines.saturating_sub(visible_height);
    let actual_scroll = app.scroll_offset.min(max_scroll);

    if app.scroll_offset != actual_scroll {
        app.scroll_offset = actual_scroll;
    }

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(transcript, area);
}

fn push_exchange(lines: &mut Vec<Line<'static>>, header: &'static str, color: Color, body: &str) {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        header,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    if body.is_empty() {
        lines.push(Line::from(""));
    } else {
        for body_line in body.lines() {
            lines.push(Line::from(Span::raw(body_line.to_string())));
        }
    }
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (indicator, color) = if let Some(percent) = app.upload_percent() {
        (format!(" [Uploading {percent}%]"), Color::Magenta)
    } else if app.query == QueryState::InFlight {
        (" [Answering...]".to_string(), Color::Yellow)
    } else if app.query_unlocked() {
        (String::new(), Color::Green)
    } else {
        (" [Upload PDFs to unlock questions]".to_string(), Color::DarkGray)
    };

    let status_text = format!("{}{indicator}", app.server_url);

    let status = Paragraph::new(status_text)
        .alignment(Alignment::Right)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));

    frame.render_widget(status, area);
}

pub fn render_question_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Question;
    let border = theme_color(&app.theme.border_color, Color::Cyan);

    let (text, style) = if !app.input_buffer.is_empty() {
        (
            app.input_buffer.as_str(),
            Style::default().fg(border).add_modifier(Modifier::BOLD),
        )
    } else if app.query_unlocked() {
        ("Type your question...", Style::default().fg(Color::Gray))
    } else {
        (
            "Upload documents to start asking questions",
            Style::default().fg(Color::DarkGray),
        )
    };

    let border_style = if focused {
        Style::default().fg(border)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(text)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(input, area);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "Tab: Switch Pane | Enter: Add/Ask | Ctrl+U: Upload | Del: Remove | Ctrl+H: Help | Ctrl+C: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    let bar = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style);

    frame.render_widget(bar, area);
}

#[allow(clippy::cast_possible_truncation)]
pub fn render_toasts(frame: &mut Frame, app: &App, area: Rect) {
    if app.notifications.is_empty() {
        return;
    }

    let width = area.width.min(46);
    let x = area.x + area.width.saturating_sub(width);

    for (index, toast) in app.notifications.iter().enumerate() {
        let y = area.y + 1 + index as u16;
        if y >= area.y + area.height {
            break;
        }
        let toast_area = Rect {
            x,
            y,
            width,
            height: 1,
        };
        let style = match toast.level {
            Level::Success => Style::default().fg(Color::Green),
            Level::Error => Style::default().fg(Color::Red),
        };

        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Paragraph::new(toast.text.clone())
                .alignment(Alignment::Right)
                .style(style.add_modifier(Modifier::BOLD)),
            toast_area,
        );
    }
}

pub fn render_help_window(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            "DocChat - Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "General:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+Q        - Quit application"),
        Line::from("  Ctrl+C        - Quit (press twice)"),
        Line::from("  Esc           - Close popup / cancel request"),
        Line::from(""),
        Line::from(Span::styled(
            "Documents:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Tab           - Switch between panes"),
        Line::from("  Enter         - Add the typed PDF path"),
        Line::from("  Up/Down       - Move the file cursor"),
        Line::from("  Delete        - Remove the selected file"),
        Line::from("  Ctrl+U        - Upload the staged PDFs"),
        Line::from(""),
        Line::from(Span::styled(
            "Questions:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Enter         - Ask the typed question"),
        Line::from("  PgUp/PgDn     - Scroll the transcript"),
        Line::from("  Home/End      - Jump to start/end"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    let popup_width = 60;
    let popup_height = 26;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}
