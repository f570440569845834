use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use notiflow_console::{app::AppState, calendar::EventItem};

pub fn event_time_label(event: &EventItem) -> String {
    event
        .effective_date()
        .map(|dt| dt.format("%d/%m %H:%M").to_string())
        .unwrap_or_else(|| "--/-- --:--".to_string())
}

pub fn render(f: &mut Frame, app: &AppState, now: DateTime<Utc>, area: Rect) {
    let events = app.listed_events(now);

    let title = match app.selected_day {
        Some(day) => format!("Eventos del {}", day.format("%d/%m/%Y")),
        None if app.filter.upcoming_only => "Próximos eventos".to_string(),
        None => format!("Eventos {}", app.filter.year),
    };

    let mut lines = vec![
        Line::from(vec![Span::styled(
            title,
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];

    if app.loading_events {
        lines.push(Line::from(Span::styled("Cargando eventos…", Style::default().fg(Color::DarkGray))));
    } else if events.is_empty() {
        lines.push(Line::from(Span::styled("Sin eventos", Style::default().fg(Color::DarkGray))));
    } else {
        let selected_base = Style::default().bg(app.theme.selected_bg).add_modifier(Modifier::BOLD);

        for (idx, event) in events.iter().enumerate() {
            let is_selected = idx == app.selected_event_index;
            let title_style = if is_selected {
                selected_base.fg(app.theme.selected_fg)
            } else {
                Style::default()
            };
            let cursor = if is_selected { ">" } else { " " };

            let mut spans = vec![
                Span::styled(cursor, Style::default().fg(app.theme.selected_bg)),
                Span::styled(event_time_label(event), Style::default().fg(app.theme.today)),
                Span::raw(" "),
                Span::styled(
                    format!("[{}]", event.event_type.label()),
                    Style::default().fg(app.theme.event_type_color(&event.event_type)),
                ),
                Span::raw(" "),
                Span::styled(event.title.as_str(), title_style),
            ];
            if app.is_deleting(&event.id) {
                spans.push(Span::styled(" eliminando…", Style::default().fg(app.theme.error)));
            }
            lines.push(Line::from(spans));

            if let Some(author) = event.created_by_name.as_deref().or(event.created_by_email.as_deref()) {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(format!("por {}", author), Style::default().fg(Color::DarkGray)),
                ]));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("j/k", Style::default().fg(app.theme.title)),
            Span::raw(" = Elegir | "),
            Span::styled("a", Style::default().fg(app.theme.success)),
            Span::raw(" = Nuevo | "),
            Span::styled("D", Style::default().fg(app.theme.success)),
            Span::raw(" = Duplicar | "),
            Span::styled("x", Style::default().fg(app.theme.error)),
            Span::raw(" = Eliminar"),
        ]));
    }

    let content = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(content, area);
}
