use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use notiflow_console::app::{AppState, Mode};
use crate::tui::{calendar_views, dialogs};

pub fn ui(f: &mut Frame, app: &AppState, now: DateTime<Local>) {
    let utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[2]);

    let stats = app.stats(utc, today);
    let viewer = app
        .viewer
        .as_ref()
        .map(|u| format!("{} ({})", if u.name.is_empty() { &u.email } else { &u.name }, u.role))
        .unwrap_or_else(|| "sin sesión".to_string());
    let title_text = format!(
        "Notiflow · Eventos {} · {} · Total {} | Próximos {} | Hoy {}",
        app.filter.year, viewer, stats.total, stats.upcoming, stats.today
    );
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, main_chunks[0]);

    let banner = app
        .events_error
        .as_deref()
        .or(app.notice.as_deref())
        .map(|text| Span::styled(text.to_string(), Style::default().fg(app.theme.banner)))
        .or_else(|| {
            (!app.recipient_errors.is_empty()).then(|| {
                Span::styled(app.recipient_errors.join(" · "), Style::default().fg(app.theme.error))
            })
        })
        .unwrap_or_else(|| Span::raw(""));
    f.render_widget(Paragraph::new(Line::from(banner)).alignment(Alignment::Center), main_chunks[1]);

    calendar_views::month::render(f, app, today, content_chunks[0]);
    calendar_views::event_list::render(f, app, utc, content_chunks[1]);

    let status_text = match app.mode {
        Mode::Search => format!("/{}", app.filter.query),
        _ => format!(
            "Tipo: {} (f) | Próximos: {} (u) | Búsqueda: {} (/) | r = Recargar | q = Salir",
            app.filter.type_filter.label(),
            if app.filter.upcoming_only { "sí" } else { "no" },
            if app.filter.query.is_empty() { "—" } else { app.filter.query.as_str() },
        ),
    };
    let status = Paragraph::new(status_text)
        .style(Style::default().fg(app.theme.status_bar))
        .alignment(if app.mode == Mode::Search { Alignment::Left } else { Alignment::Center })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, main_chunks[3]);

    if app.event_form.is_some() {
        dialogs::event_form::render(f, app);
    }

    if app.delete_confirmation_event_id.is_some() {
        dialogs::delete_confirmation::render(f, app);
    }
}
