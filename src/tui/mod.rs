pub mod app;
pub mod confirm;
pub mod form;
pub mod list;
pub mod ui;

use std::{io, time::Duration};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend as TerminalBackend, CrosstermBackend},
    Terminal,
};
use tokio::sync::watch;
use tracing::info;

use crate::backend::Backend;
use crate::config::Config;
use crate::session::{IdentitySession, SessionState};
use app::{App, Focus};
use ui::ui;

pub async fn run_tui(backend: Backend, config: &Config) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    let session = IdentitySession::start(backend.auth.clone(), config.custom_token.clone());
    let mut session_rx = session.watch();
    let mut app = App::new(backend.store.clone(), config.app_id.clone());

    let res = run_app(&mut terminal, &mut app, &mut session_rx).await;

    // Release the live query and the auth listener before handing the terminal back.
    drop(app);
    drop(session);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: TerminalBackend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session_rx: &mut watch::Receiver<SessionState>,
) -> anyhow::Result<()> {
    loop {
        if session_rx.has_changed().unwrap_or(false) {
            let session = session_rx.borrow_and_update().clone();
            app.set_session(session).await;
        }
        app.refresh();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, key) {
                    info!("Quit requested");
                    return Ok(());
                }
            }
        }
    }
}

/// Routes one key press. Returns true when the user asked to quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.delete_flow.pending().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return false;
    }

    match app.focus {
        Focus::List => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('e') | KeyCode::Enter => app.edit_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),
            KeyCode::Char('a') | KeyCode::Tab => app.start_create(),
            _ => {}
        },
        Focus::Form => match key.code {
            KeyCode::Enter => app.submit_form(),
            KeyCode::Esc => app.cancel_form(),
            KeyCode::Tab | KeyCode::Down => app.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.form.focus_previous(),
            KeyCode::Backspace => app.form.backspace(),
            KeyCode::Char(c) => app.form.push(c),
            _ => {}
        },
    }
    false
}
