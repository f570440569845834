use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use notiflow_console::{app::AppState, ui::month_view};

const MONTHS: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];
const WEEKDAYS: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];

pub fn month_name(month: u32) -> &'static str {
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

pub fn render(f: &mut Frame, app: &AppState, today: NaiveDate, area: Rect) {
    let layout = month_view::calculate_layout(app, today);

    let mut lines = vec![
        Line::from(vec![Span::styled(
            format!("{} {}", month_name(layout.month), layout.year),
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(
            WEEKDAYS
                .iter()
                .map(|d| Span::styled(format!(" {:<4}", d), Style::default().fg(app.theme.weekday_header)))
                .collect::<Vec<_>>(),
        ),
    ];

    for week in &layout.weeks {
        let mut day_spans = Vec::new();

        for day_cell in &week.days {
            let Some(date) = day_cell.date else {
                day_spans.push(Span::raw("     "));
                continue;
            };

            let marker = if day_cell.event_count > 0 { '•' } else { ' ' };
            let day_text = format!(" {:>2}{} ", date.day(), marker);

            let mut style = Style::default();
            if day_cell.is_selected {
                style = style
                    .bg(app.theme.selected_bg)
                    .fg(app.theme.selected_fg)
                    .add_modifier(Modifier::BOLD);
            } else if day_cell.is_today {
                style = style.fg(app.theme.today).add_modifier(Modifier::BOLD);
            } else if day_cell.event_count > 0 {
                style = style.fg(app.theme.event_indicator);
            }

            day_spans.push(Span::styled(day_text, style));
        }

        lines.push(Line::from(day_spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("hjkl", Style::default().fg(app.theme.title)),
        Span::raw(" = Moverse | "),
        Span::styled("{ }", Style::default().fg(app.theme.title)),
        Span::raw(" = Mes | "),
        Span::styled("t", Style::default().fg(app.theme.title)),
        Span::raw(" = Hoy | "),
        Span::styled("Esc", Style::default().fg(app.theme.title)),
        Span::raw(" = Próximos"),
    ]));

    let content = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(content, area);
}
