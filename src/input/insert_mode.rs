use crossterm::event::KeyCode;

use crate::app::{AppState, FormField};

pub fn handle_key(key: KeyCode, state: &mut AppState) {
    let group_ids: Vec<String> = state.groups.iter().map(|g| g.id.clone()).collect();
    let people_ids: Vec<String> = state
        .form_people()
        .into_iter()
        .map(|r| r.selection_id)
        .collect();

    let Some(form) = state.event_form.as_mut() else {
        return;
    };

    let list_len = match form.active_field {
        FormField::Groups => group_ids.len(),
        FormField::People => people_ids.len(),
        _ => 0,
    };

    match key {
        KeyCode::Tab => form.next_field(),
        KeyCode::BackTab => form.prev_field(),
        KeyCode::Down if list_len > 0 => {
            form.list_cursor = (form.list_cursor + 1).min(list_len - 1);
        }
        KeyCode::Up => form.list_cursor = form.list_cursor.saturating_sub(1),
        KeyCode::Right | KeyCode::Left if form.active_field == FormField::Type => {
            form.event_type = form.event_type.next_canonical();
        }
        KeyCode::Right => {
            let ids = match form.active_field {
                FormField::Groups => &group_ids,
                FormField::People => &people_ids,
                _ => return,
            };
            if let Some(id) = ids.get(form.list_cursor) {
                match form.active_field {
                    FormField::Groups => form.group_selection.toggle(id),
                    _ => form.user_selection.toggle(id),
                }
            }
        }
        KeyCode::Backspace => match form.active_field {
            FormField::Title => {
                form.title.pop();
            }
            FormField::Start => {
                form.start.pop();
            }
            FormField::End => {
                form.end.pop();
            }
            FormField::Description => {
                form.description.pop();
            }
            FormField::People => {
                form.recipient_query.pop();
                form.list_cursor = 0;
            }
            FormField::Type | FormField::Groups => {}
        },
        KeyCode::Char(c) => match form.active_field {
            FormField::Title => form.title.push(c),
            FormField::Start | FormField::End => {
                if is_datetime_char(c) {
                    let target = if form.active_field == FormField::Start {
                        &mut form.start
                    } else {
                        &mut form.end
                    };
                    if target.len() < 16 {
                        target.push(c);
                    }
                }
            }
            FormField::Type => {
                if c == ' ' {
                    form.event_type = form.event_type.next_canonical();
                }
            }
            FormField::Description => form.description.push(c),
            FormField::Groups => {
                if c == ' ' {
                    if let Some(id) = group_ids.get(form.list_cursor) {
                        form.group_selection.toggle(id);
                    }
                }
            }
            FormField::People => {
                form.recipient_query.push(c);
                form.list_cursor = 0;
            }
        },
        _ => {}
    }
}

fn is_datetime_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | ':' | 'T' | ' ')
}
