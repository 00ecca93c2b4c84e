mod api;
mod app;
mod config;
mod events;
mod logging;
mod models;
mod notify;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use api::RagClient;
use app::{App, Focus};
use events::AppEvent;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config()?;

    // A failed logger never blocks the session; the warning lands on stderr
    // before the alternate screen takes over.
    match config::get_log_path() {
        Ok(log_path) => {
            if let Err(err) = logging::initialize(&log_path) {
                eprintln!("Warning: file logging disabled: {err:#}");
            }
        }
        Err(err) => eprintln!("Warning: file logging disabled: {err:#}"),
    }
    log::info!("starting docchat against {}", cfg.server_url);

    let client = RagClient::new(cfg.server_url.clone(), cfg.request_timeout)?;
    let mut app = App::new(&cfg);

    // PDFs passed on the command line go through the normal staging path
    for arg in std::env::args_os().skip(1) {
        app.add_file(PathBuf::from(arg));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Channel for completion events from spawned network tasks
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let res = run_app(&mut terminal, &mut app, &client, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &RagClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut upload_task: Option<JoinHandle<()>> = None;
    let mut query_task: Option<JoinHandle<()>> = None;

    loop {
        app.tick();
        terminal.draw(|f| ui::render(f, app))?;

        // Drain pending async events before reading the keyboard; progress
        // callbacks can queue many per frame.
        while let Ok(app_event) = event_rx.try_recv() {
            handle_app_event(app, app_event);
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(
                        app,
                        key.code,
                        key.modifiers,
                        client,
                        event_tx,
                        &mut upload_task,
                        &mut query_task,
                    );
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::UploadProgress(percent) => app.upload_progress(percent),
        AppEvent::UploadFinished(message) => {
            log::info!("upload succeeded: {message}");
            app.finish_upload(message);
        }
        AppEvent::UploadFailed(detail) => {
            // The detail goes to the log only; the user sees a generic toast
            log::error!("upload failed: {detail}");
            app.fail_upload();
        }
        AppEvent::QueryAnswered { question, answer } => {
            log::info!("answered question ({} chars)", answer.len());
            app.finish_query(question, answer);
        }
        AppEvent::QueryFailed(detail) => {
            log::error!("query failed: {detail}");
            app.fail_query();
        }
    }
}

fn handle_key(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    client: &RagClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    upload_task: &mut Option<JoinHandle<()>>,
    query_task: &mut Option<JoinHandle<()>>,
) {
    // The help popup swallows everything except its close keys
    if app.show_help {
        match key {
            KeyCode::Esc => app.show_help = false,
            KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => app.toggle_help(),
            _ => {}
        }
        return;
    }

    match key {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            return;
        }
        KeyCode::Esc => {
            if app.exit_pending {
                app.exit_pending = false;
            } else if app.cancel_upload() {
                abort(upload_task);
            } else if app.cancel_query() {
                abort(query_task);
            }
            return;
        }
        _ if app.exit_pending => {
            // Any other key cancels the pending exit
            app.exit_pending = false;
        }
        _ => {}
    }

    match key {
        KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => app.toggle_help(),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(handle) = start_upload(app, client, event_tx) {
                *upload_task = Some(handle);
            }
        }
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Enter => match app.focus {
            Focus::Files => app.submit_path(),
            Focus::Question => {
                if let Some(handle) = start_query(app, client, event_tx) {
                    *query_task = Some(handle);
                }
            }
        },
        KeyCode::Backspace => {
            match app.focus {
                Focus::Files => app.path_buffer.pop(),
                Focus::Question => app.input_buffer.pop(),
            };
        }
        KeyCode::Delete if app.focus == Focus::Files => app.remove_selected_file(),
        KeyCode::Up => match app.focus {
            Focus::Files => app.file_cursor_up(),
            Focus::Question => app.scroll_up(1),
        },
        KeyCode::Down => match app.focus {
            Focus::Files => app.file_cursor_down(),
            Focus::Question => app.scroll_down(1),
        },
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),
        KeyCode::Char(c) => match app.focus {
            Focus::Files => app.path_buffer.push(c),
            Focus::Question => app.input_buffer.push(c),
        },
        _ => {}
    }
}

fn abort(task: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = task.take() {
        handle.abort();
    }
}

fn start_upload(
    app: &mut App,
    client: &RagClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    if !app.begin_upload() {
        return None;
    }

    let client = client.clone();
    let mode = app.upload_mode;
    let files = app.files.clone();
    let tx = event_tx.clone();
    let progress_tx = event_tx.clone();

    Some(tokio::spawn(async move {
        let on_progress: api::ProgressFn = Arc::new(move |percent| {
            let _ = progress_tx.send(AppEvent::UploadProgress(percent));
        });

        match client.upload(mode, &files, on_progress).await {
            Ok(reply) => {
                let _ = tx.send(AppEvent::UploadFinished(reply.message));
            }
            Err(err) => {
                let _ = tx.send(AppEvent::UploadFailed(err.to_string()));
            }
        }
    }))
}

fn start_query(
    app: &mut App,
    client: &RagClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    let question = app.begin_query()?;

    let client = client.clone();
    let tx = event_tx.clone();

    Some(tokio::spawn(async move {
        match client.query(&question).await {
            Ok(reply) => {
                let _ = tx.send(AppEvent::QueryAnswered {
                    question,
                    answer: reply.response,
                });
            }
            Err(err) => {
                let _ = tx.send(AppEvent::QueryFailed(err.to_string()));
            }
        }
    }))
}
