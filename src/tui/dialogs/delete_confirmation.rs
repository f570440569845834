use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use notiflow_console::app::AppState;

pub fn render(f: &mut Frame, app: &AppState) {
    let Some(event_id) = &app.delete_confirmation_event_id else {
        return;
    };

    let event_title = app
        .find_event(event_id)
        .map(|e| e.title.as_str())
        .unwrap_or("este evento");

    let area = f.size();
    let dialog_width = 60.min(area.width);
    let dialog_height = 10.min(area.height);
    let dialog_area = Rect {
        x: (area.width.saturating_sub(dialog_width)) / 2,
        y: (area.height.saturating_sub(dialog_height)) / 2,
        width: dialog_width,
        height: dialog_height,
    };

    f.render_widget(Clear, dialog_area);

    let dialog_text = vec![
        Line::from(Span::styled(
            "¿Eliminar evento?",
            Style::default().fg(app.theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Se eliminará "),
            Span::styled(event_title, Style::default().fg(app.theme.banner).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from("Esta acción no se puede deshacer."),
        Line::from(""),
        Line::from(vec![
            Span::styled("S", Style::default().fg(app.theme.success)),
            Span::raw(" = Sí, eliminar | "),
            Span::styled("N", Style::default().fg(app.theme.error)),
            Span::raw(" = No, cancelar"),
        ]),
    ];

    let dialog = Paragraph::new(dialog_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirmar ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Center);

    f.render_widget(dialog, dialog_area);
}
