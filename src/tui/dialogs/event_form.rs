use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use notiflow_console::app::{AppState, EventForm, FormField};

const LIST_ROWS: usize = 5;

pub fn render(f: &mut Frame, app: &AppState) {
    let Some(form) = &app.event_form else {
        return;
    };

    let area = f.size();
    let form_width = 76.min(area.width);
    let form_height = 34.min(area.height);
    let form_area = Rect {
        x: (area.width.saturating_sub(form_width)) / 2,
        y: (area.height.saturating_sub(form_height)) / 2,
        width: form_width,
        height: form_height,
    };

    f.render_widget(Clear, form_area);

    let active_color = app.theme.selected_bg;
    let inactive_color = Color::DarkGray;
    let label = |field: FormField, text: &'static str| {
        let color = if form.active_field == field { active_color } else { inactive_color };
        Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    let form_title = if form.is_editing() { "Editar evento" } else { "Nuevo evento" };

    let mut lines = vec![
        Line::from(Span::styled(form_title, Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![label(FormField::Title, "Título: "), Span::raw(form.title.as_str())]),
        Line::from(vec![
            label(FormField::Start, "Inicio: "),
            Span::raw(form.start.as_str()),
            Span::styled("  (AAAA-MM-DDTHH:MM)", Style::default().fg(inactive_color)),
        ]),
        Line::from(vec![label(FormField::End, "Término: "), Span::raw(form.end.as_str())]),
        Line::from(vec![
            label(FormField::Type, "Tipo: "),
            Span::styled(
                form.event_type.label(),
                Style::default().fg(app.theme.event_type_color(&form.event_type)),
            ),
        ]),
        Line::from(vec![label(FormField::Description, "Descripción: "), Span::raw(form.description.as_str())]),
        Line::from(""),
        Line::from(vec![
            label(FormField::Groups, "Grupos "),
            Span::styled(format!("({} seleccionados)", form.group_selection.len()), Style::default().fg(inactive_color)),
        ]),
    ];

    let groups: Vec<(String, String, bool)> = app
        .groups
        .iter()
        .map(|g| (g.id.clone(), g.name.clone(), form.group_selection.contains(&g.id)))
        .collect();
    lines.extend(list_lines(app, form, FormField::Groups, &groups));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        label(FormField::People, "Personas "),
        Span::styled(format!("({} seleccionadas) ", form.user_selection.len()), Style::default().fg(inactive_color)),
        Span::raw("Buscar: "),
        Span::raw(form.recipient_query.as_str()),
    ]));
    if app.loading_recipients {
        lines.push(Line::from(Span::styled("  Cargando destinatarios…", Style::default().fg(inactive_color))));
    }

    let people: Vec<(String, String, bool)> = app
        .form_people()
        .into_iter()
        .map(|r| {
            let selected = form.user_selection.contains(&r.selection_id);
            let text = match &r.email {
                Some(email) => format!("{} <{}> · {}", r.name, email, r.badge.label()),
                None => format!("{} · {}", r.name, r.badge.label()),
            };
            (r.selection_id, text, selected)
        })
        .collect();
    lines.extend(list_lines(app, form, FormField::People, &people));

    lines.push(Line::from(""));
    if app.saving {
        lines.push(Line::from(Span::styled("Guardando…", Style::default().fg(app.theme.banner))));
    } else if !form.can_submit(app.saving) {
        lines.push(Line::from(Span::styled(
            "Título e inicio son obligatorios",
            Style::default().fg(app.theme.error),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("Tab", Style::default().fg(app.theme.title)),
        Span::raw(" = Campo | "),
        Span::styled("→/Espacio", Style::default().fg(app.theme.title)),
        Span::raw(" = Elegir | "),
        Span::styled("Enter", Style::default().fg(app.theme.success)),
        Span::raw(" = Guardar | "),
        Span::styled("Esc", Style::default().fg(app.theme.error)),
        Span::raw(" = Cancelar"),
    ]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Evento ")
            .style(Style::default().bg(Color::Black)),
    );
    f.render_widget(paragraph, form_area);
}

fn list_lines<'a>(
    app: &AppState,
    form: &EventForm,
    field: FormField,
    entries: &'a [(String, String, bool)],
) -> Vec<Line<'a>> {
    if entries.is_empty() {
        return vec![Line::from(Span::styled("  (vacío)", Style::default().fg(Color::DarkGray)))];
    }

    let focused = form.active_field == field;
    let cursor = if focused { form.list_cursor } else { 0 };
    let start = cursor.saturating_sub(LIST_ROWS - 1);

    entries
        .iter()
        .enumerate()
        .skip(start)
        .take(LIST_ROWS)
        .map(|(idx, (_, text, selected))| {
            let check = if *selected { "[x] " } else { "[ ] " };
            let style = if focused && idx == cursor {
                Style::default().bg(app.theme.selected_bg).fg(app.theme.selected_fg)
            } else {
                Style::default()
            };
            Line::from(vec![Span::raw("  "), Span::styled(format!("{}{}", check, text), style)])
        })
        .collect()
}
