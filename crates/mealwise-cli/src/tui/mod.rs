//! Interactive TUI: profile wizard, plan viewer, chat and progress log.

pub mod app;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use mealwise_core::chat::GeminiChatBackend;
use mealwise_core::gateway::GeminiPlanGateway;
use mealwise_core::wizard::{ResetKind, Step, Tab};

use crate::config::MealwiseConfig;
use app::{App, AppEvent};

/// Launch the interactive wizard.
pub async fn run_wizard(config: &MealwiseConfig) -> Result<()> {
    let gateway = Arc::new(GeminiPlanGateway::new(
        config.client(),
        config.language.clone(),
    ));
    let chat = Arc::new(GeminiChatBackend::new(config.client()));
    let (mut app, mut events) = App::new(gateway, chat, config.progress_log(), &config.language);

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, &mut events).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        // Apply finished background work.
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }
        app.tick(Instant::now());

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(app.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.status_message = None;
                    handle_key(app, key);
                }
            }
        } else {
            // Let spawned tasks make progress between frames.
            tokio::task::yield_now().await;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Route a key press to the focused part of the UI.
pub(crate) fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Modal overlays swallow every other key.
    if app.wizard.pending_reset().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_reset(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_reset(),
            _ => {}
        }
        return;
    }
    if app.show_help {
        app.toggle_help();
        return;
    }

    match key.code {
        KeyCode::F(1) => {
            app.toggle_help();
            return;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('r') if ctrl => {
            app.request_reset(ResetKind::Full);
            return;
        }
        KeyCode::Char('l') if ctrl => {
            app.request_reset(ResetKind::FormOnly);
            return;
        }
        KeyCode::Char('e') if ctrl => {
            app.export_pdf();
            return;
        }
        _ => {}
    }
    if ctrl {
        return;
    }

    match app.wizard.step() {
        Step::Personal | Step::Body | Step::Lifestyle | Step::Terms => match key.code {
            KeyCode::Up => app.move_up(),
            KeyCode::Down | KeyCode::Tab => app.move_down(),
            KeyCode::Left => app.cycle_choice(false),
            KeyCode::Right => app.cycle_choice(true),
            KeyCode::Enter => app.advance(),
            KeyCode::BackTab | KeyCode::PageUp => app.go_back(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) => app.type_char(c),
            _ => {}
        },
        Step::Processing => {}
        Step::Result => match key.code {
            KeyCode::Tab => app.cycle_tab(true),
            KeyCode::BackTab => app.cycle_tab(false),
            _ => handle_tab_key(app, key),
        },
    }
}

fn handle_tab_key(app: &mut App, key: KeyEvent) {
    match app.wizard.tab() {
        Tab::Home => match key.code {
            KeyCode::Up => app.scroll_up(),
            KeyCode::Down => app.scroll_down(),
            _ => {}
        },
        Tab::Plan => match key.code {
            KeyCode::Left => app.prev_day(),
            KeyCode::Right => app.next_day(),
            KeyCode::Up => app.scroll_up(),
            KeyCode::Down => app.scroll_down(),
            _ => {}
        },
        Tab::Chat => match key.code {
            KeyCode::Enter => app.send_chat(),
            KeyCode::Backspace => {
                app.chat_input.pop();
            }
            KeyCode::Up => app.scroll_up(),
            KeyCode::Down => app.scroll_down(),
            KeyCode::Char(c) => app.chat_input.push(c),
            _ => {}
        },
        Tab::Progress => match key.code {
            KeyCode::Up => app.progress_move(false),
            KeyCode::Down => app.progress_move(true),
            KeyCode::Enter => app.save_progress(),
            KeyCode::Backspace => app.progress_backspace(),
            KeyCode::Char(c) => app.progress_type(c),
            _ => {}
        },
    }
}
