use std::io;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use notiflow_console::{
    app::{AppState, Mode},
    calendar::{EventItem, sample_events::sample_events},
    input::{insert_mode, normal_mode, search_mode},
    storage::config::Config,
    store::AppContext,
    sync::{
        api_client::{DirectoryQuery, HttpConsoleClient},
        loader::{self, LoadError},
        session::SessionError,
    },
    ui::theme::Theme,
};
use crate::tui::presentation::ui;

const SAVE_FALLBACK_MESSAGE: &str = "No se pudo guardar el evento";

/// Opens the interactive console. With `sample` set no session is needed and
/// the demo agenda is shown offline.
pub async fn run_tui(config: Config, sample: bool, month: Option<NaiveDate>) -> anyhow::Result<()> {
    let (client, session) = if sample {
        (None, None)
    } else {
        match loader::open_session(&config) {
            Ok((client, session)) => (Some(client), Some(session)),
            Err(LoadError::Session(SessionError::NotLoggedIn)) => {
                bail!("No hay una sesión activa. Inicia sesión con --login EMAIL o usa --sample")
            }
            Err(e) => return Err(e).context("No se pudo abrir la sesión"),
        }
    };

    let now = Local::now();
    let today = now.date_naive();
    let ctx = AppContext::new(session.and_then(|s| s.user));

    let mut app = AppState::new(today)
        .with_theme(Theme::get_by_name(&config.ui.theme))
        .with_viewer(ctx.auth.user().cloned());
    app.filter.window = config.events.window();
    app.filter.upcoming_only = config.events.default_upcoming_only;
    app.filter.year = ctx.year.effective_year(today);
    if let Some(month) = month {
        app.show_month(month);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = async {
        reload(&mut terminal, &mut app, client.as_ref()).await?;
        run_app(&mut terminal, &mut app, client.as_ref()).await
    }
    .await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(res?)
}

fn directory_query(app: &AppState) -> DirectoryQuery {
    let school_id = app
        .viewer
        .as_ref()
        .filter(|u| !u.is_global_admin())
        .and_then(|u| u.school_id.clone());
    DirectoryQuery {
        school_id,
        year: Some(app.filter.year),
        ..DirectoryQuery::default()
    }
}

async fn reload<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    client: Option<&HttpConsoleClient>,
) -> io::Result<()> {
    let Some(client) = client else {
        app.replace_events(sample_events(Utc::now()), None);
        return Ok(());
    };

    app.loading_events = true;
    app.loading_recipients = true;
    terminal.draw(|f| ui(f, app, Local::now()))?;

    let query = directory_query(app);
    let (events, recipients) = tokio::join!(
        loader::load_events(client, Utc::now()),
        loader::load_recipients(client, &query),
    );
    if events.used_samples {
        tracing::warn!("Showing sample events after a failed load");
    }
    events.apply(app);
    recipients.apply(app);
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    client: Option<&HttpConsoleClient>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app, Local::now()))?;

        if let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if app.delete_confirmation_event_id.is_some() {
                handle_delete_confirmation(key.code, app, terminal, client).await?;
                continue;
            }

            match app.mode {
                Mode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('r') => {
                        app.notice = None;
                        reload(terminal, app, client).await?;
                    }
                    code => normal_mode::handle_key(code, app, Local::now()),
                },
                Mode::Search => search_mode::handle_key(key.code, app),
                Mode::Insert => handle_insert_mode(key.code, app, terminal, client).await?,
            }
        }
    }
}

async fn handle_insert_mode<B: ratatui::backend::Backend>(
    code: KeyCode,
    app: &mut AppState,
    terminal: &mut Terminal<B>,
    client: Option<&HttpConsoleClient>,
) -> io::Result<()> {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => {
            if !app.can_submit_form() {
                return Ok(());
            }
            let Some(payload) = app.event_form.as_ref().map(|form| form.to_payload()) else {
                return Ok(());
            };

            app.saving = true;
            terminal.draw(|f| ui(f, app, Local::now()))?;

            let Some(client) = client else {
                app.add_created_event(EventItem::from_payload(&payload));
                app.saving = false;
                app.close_form();
                return Ok(());
            };

            match loader::create_event(client, &payload).await {
                Ok(outcome) => {
                    tracing::info!("Event saved: {}", payload.title);
                    outcome.apply(app);
                    app.events_error = None;
                    app.close_form();
                }
                Err(e) => {
                    tracing::error!("Failed to save event: {}", e);
                    app.events_error = Some(e.user_message(SAVE_FALLBACK_MESSAGE));
                }
            }
            app.saving = false;
        }
        _ => insert_mode::handle_key(code, app),
    }
    Ok(())
}

async fn handle_delete_confirmation<B: ratatui::backend::Backend>(
    code: KeyCode,
    app: &mut AppState,
    terminal: &mut Terminal<B>,
    client: Option<&HttpConsoleClient>,
) -> io::Result<()> {
    match code {
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('y') | KeyCode::Char('Y') => {
            let Some(event_id) = app.delete_confirmation_event_id.clone() else {
                return Ok(());
            };
            tracing::info!("Deleting event: {}", event_id);

            if !loader::start_delete(app, &event_id) {
                return Ok(());
            }

            let deleted = match client {
                Some(client) => {
                    terminal.draw(|f| ui(f, app, Local::now()))?;
                    loader::finish_delete(client, app, &event_id).await
                }
                None => {
                    app.finish_delete(&event_id, Ok(()));
                    true
                }
            };
            if deleted {
                tracing::info!("Event deleted successfully");
                app.move_event_selection_up();
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.delete_confirmation_event_id = None;
        }
        _ => {}
    }
    Ok(())
}
