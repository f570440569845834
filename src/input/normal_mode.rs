use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use crossterm::event::KeyCode;

use crate::app::{AppState, Mode};
use crate::ui::month_view::days_in_month;

pub fn handle_key(key: KeyCode, state: &mut AppState, now: DateTime<Local>) {
    let utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    match key {
        KeyCode::Char('h') | KeyCode::Left => shift_days(state, -1, today),
        KeyCode::Char('l') | KeyCode::Right => shift_days(state, 1, today),
        KeyCode::Char('j') | KeyCode::Down => {
            if state.listed_events(utc).is_empty() {
                shift_days(state, 7, today);
            } else {
                state.move_event_selection_down(utc);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if state.listed_events(utc).is_empty() {
                shift_days(state, -7, today);
            } else {
                state.move_event_selection_up();
            }
        }
        KeyCode::Char('J') => shift_days(state, 7, today),
        KeyCode::Char('K') => shift_days(state, -7, today),
        KeyCode::Char('t') => state.go_to_today(today),
        KeyCode::Char('{') => state.previous_month(),
        KeyCode::Char('}') => state.next_month(),
        KeyCode::Char('g') => {
            let first = state.month_cursor;
            state.select_day(first);
        }
        KeyCode::Char('G') => move_to_end_of_month(state),
        KeyCode::Esc => state.clear_selected_day(),
        KeyCode::Char('u') => state.toggle_upcoming_only(),
        KeyCode::Char('f') => state.cycle_type_filter(),
        KeyCode::Char('/') => state.mode = Mode::Search,
        KeyCode::Char('a') => open_new_event(state),
        KeyCode::Char('D') => {
            if state.can_create() {
                state.open_duplicate_form(utc);
            }
        }
        KeyCode::Char('E') => {
            if state.can_create() {
                state.open_edit_form(utc);
            }
        }
        KeyCode::Char('x') => state.request_delete(utc),
        _ => {}
    }
}

fn shift_days(state: &mut AppState, days: i64, today: NaiveDate) {
    let from = state.selected_day.unwrap_or(today);
    let moved = if days >= 0 {
        from.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        from.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    if let Some(day) = moved {
        state.select_day(day);
    }
}

fn move_to_end_of_month(state: &mut AppState) {
    let cursor = state.month_cursor;
    let last = days_in_month(cursor.year(), cursor.month());
    if let Some(day) = NaiveDate::from_ymd_opt(cursor.year(), cursor.month(), last) {
        state.select_day(day);
    }
}

fn open_new_event(state: &mut AppState) {
    if state.can_create() {
        state.open_new_event_form();
    } else {
        state.notice = Some("Tu rol no permite crear eventos".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{AuthUser, EventAudience, EventItem, EventType};
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn state() -> AppState {
        AppState::new(date(2025, 1, 15))
    }

    fn teacher() -> AuthUser {
        AuthUser {
            email: "prof@x.com".to_string(),
            role: "TEACHER".to_string(),
            school_id: Some("s1".to_string()),
            ..AuthUser::default()
        }
    }

    #[test]
    fn h_key_moves_to_previous_day() {
        let mut state = state();

        handle_key(KeyCode::Char('h'), &mut state, now());

        assert_eq!(state.selected_day, Some(date(2025, 1, 14)));
    }

    #[test]
    fn l_key_crosses_into_next_month() {
        let mut state = state();
        state.select_day(date(2025, 1, 31));

        handle_key(KeyCode::Char('l'), &mut state, now());

        assert_eq!(state.selected_day, Some(date(2025, 2, 1)));
        assert_eq!(state.month_cursor, date(2025, 2, 1));
    }

    #[test]
    fn j_key_moves_down_one_week_when_no_events() {
        let mut state = state();

        handle_key(KeyCode::Char('j'), &mut state, now());

        assert_eq!(state.selected_day, Some(date(2025, 1, 22)));
    }

    #[test]
    fn j_key_moves_event_selection_when_day_has_events() {
        let mut state = state();
        let event = |id: &str, start: &str| EventItem {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            start_date_time: Some(start.to_string()),
            end_date_time: None,
            created_at: None,
            event_type: EventType::Colegio,
            created_by_name: None,
            created_by_email: None,
            school_id: None,
            audience: EventAudience::default(),
        };
        state.replace_events(
            vec![event("a", "2025-01-15T09:00:00Z"), event("b", "2025-01-15T10:00:00Z")],
            None,
        );

        handle_key(KeyCode::Char('j'), &mut state, now());

        assert_eq!(state.selected_day, Some(date(2025, 1, 15)));
        assert_eq!(state.selected_event_index, 1);
    }

    #[test]
    fn braces_move_between_months() {
        let mut state = state();

        handle_key(KeyCode::Char('}'), &mut state, now());
        assert_eq!(state.month_cursor, date(2025, 2, 1));

        handle_key(KeyCode::Char('{'), &mut state, now());
        handle_key(KeyCode::Char('{'), &mut state, now());
        assert_eq!(state.month_cursor, date(2024, 12, 1));
        assert_eq!(state.filter.year, 2024);
    }

    #[test]
    fn g_and_shift_g_select_month_bounds() {
        let mut state = state();

        handle_key(KeyCode::Char('g'), &mut state, now());
        assert_eq!(state.selected_day, Some(date(2025, 1, 1)));

        handle_key(KeyCode::Char('G'), &mut state, now());
        assert_eq!(state.selected_day, Some(date(2025, 1, 31)));
    }

    #[test]
    fn t_key_returns_to_today() {
        let mut state = state();
        state.select_day(date(2025, 3, 3));

        handle_key(KeyCode::Char('t'), &mut state, now());

        assert_eq!(state.selected_day, Some(date(2025, 1, 15)));
        assert_eq!(state.month_cursor, date(2025, 1, 1));
    }

    #[test]
    fn esc_clears_selected_day() {
        let mut state = state();

        handle_key(KeyCode::Esc, &mut state, now());

        assert_eq!(state.selected_day, None);
    }

    #[test]
    fn u_and_f_change_filters() {
        let mut state = state();

        handle_key(KeyCode::Char('u'), &mut state, now());
        handle_key(KeyCode::Char('f'), &mut state, now());

        assert!(!state.filter.upcoming_only);
        assert_eq!(state.filter.type_filter.label(), "Evento colegio");
    }

    #[test]
    fn slash_enters_search_mode() {
        let mut state = state();

        handle_key(KeyCode::Char('/'), &mut state, now());

        assert_eq!(state.mode, Mode::Search);
    }

    #[test]
    fn a_key_opens_form_for_staff_only() {
        let mut anonymous = state();
        handle_key(KeyCode::Char('a'), &mut anonymous, now());
        assert!(anonymous.event_form.is_none());
        assert!(anonymous.notice.is_some());

        let mut staff = state().with_viewer(Some(teacher()));
        handle_key(KeyCode::Char('a'), &mut staff, now());
        assert_eq!(staff.mode, Mode::Insert);
        assert_eq!(staff.event_form.as_ref().unwrap().start, "2025-01-15T08:00");
    }
}
