use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::calendar::directory::{filter_recipients, merge_recipients};
use crate::calendar::filter::{event_stats, filter_events, visible_events};
use crate::calendar::{
    AuthUser, DirectoryUser, EventAudience, EventFilter, EventItem, EventPayload, EventStats,
    EventType, Group, Recipient, Selection, Student, can_create_events, can_delete_event,
    parse_timestamp, to_iso_string,
};
use crate::ui::month_view::events_by_day;
use crate::ui::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Search,
    Insert,
}

pub struct AppState {
    pub mode: Mode,
    pub viewer: Option<AuthUser>,
    pub events: Vec<EventItem>,
    pub events_error: Option<String>,
    pub loading_events: bool,
    pub month_cursor: NaiveDate,
    pub selected_day: Option<NaiveDate>,
    pub filter: EventFilter,
    pub users: Vec<DirectoryUser>,
    pub groups: Vec<Group>,
    pub students: Vec<Student>,
    pub loading_recipients: bool,
    pub recipient_errors: Vec<String>,
    pub event_form: Option<EventForm>,
    pub saving: bool,
    pub selected_event_index: usize,
    pub delete_confirmation_event_id: Option<String>,
    pub notice: Option<String>,
    pub theme: Theme,
    deleting: HashSet<String>,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mode: Mode::Normal,
            viewer: None,
            events: Vec::new(),
            events_error: None,
            loading_events: false,
            month_cursor: first_of_month(today),
            selected_day: Some(today),
            filter: EventFilter::for_year(today.year()),
            users: Vec::new(),
            groups: Vec::new(),
            students: Vec::new(),
            loading_recipients: false,
            recipient_errors: Vec::new(),
            event_form: None,
            saving: false,
            selected_event_index: 0,
            delete_confirmation_event_id: None,
            notice: None,
            theme: Theme::default(),
            deleting: HashSet::new(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_viewer(mut self, viewer: Option<AuthUser>) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn replace_events(&mut self, events: Vec<EventItem>, error: Option<String>) {
        self.events = events;
        self.events_error = error;
        self.loading_events = false;
        self.reset_event_selection();
    }

    pub fn add_created_event(&mut self, event: EventItem) {
        self.events.insert(0, event);
    }

    pub fn remove_event(&mut self, event_id: &str) {
        self.events.retain(|e| e.id != event_id);
        self.deleting.remove(event_id);
        if self.delete_confirmation_event_id.as_deref() == Some(event_id) {
            self.delete_confirmation_event_id = None;
        }
    }

    pub fn find_event(&self, event_id: &str) -> Option<&EventItem> {
        self.events.iter().find(|e| e.id == event_id)
    }

    /// Year, text and type filters applied; drives the grid badges.
    pub fn filtered_events(&self) -> Vec<&EventItem> {
        filter_events(&self.events, &self.filter)
    }

    pub fn visible_events(&self, now: DateTime<Utc>) -> Vec<&EventItem> {
        visible_events(&self.events, &self.filter, now)
    }

    pub fn events_on_day(&self, day: NaiveDate) -> Vec<&EventItem> {
        events_by_day(self.filtered_events())
            .remove(&day)
            .unwrap_or_default()
    }

    /// The day panel when a day is selected, the upcoming list otherwise.
    pub fn listed_events(&self, now: DateTime<Utc>) -> Vec<&EventItem> {
        match self.selected_day {
            Some(day) => self.events_on_day(day),
            None => self.visible_events(now),
        }
    }

    pub fn stats(&self, now: DateTime<Utc>, today: NaiveDate) -> EventStats {
        event_stats(&self.events, &self.filter, now, today)
    }

    pub fn show_month(&mut self, date: NaiveDate) {
        self.month_cursor = first_of_month(date);
        self.filter.year = self.month_cursor.year();
    }

    pub fn next_month(&mut self) {
        if let Some(next) = self.month_cursor.checked_add_months(chrono::Months::new(1)) {
            self.show_month(next);
        }
    }

    pub fn previous_month(&mut self) {
        if let Some(prev) = self.month_cursor.checked_sub_months(chrono::Months::new(1)) {
            self.show_month(prev);
        }
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.show_month(today);
        self.select_day(today);
    }

    pub fn select_day(&mut self, day: NaiveDate) {
        if first_of_month(day) != self.month_cursor {
            self.show_month(day);
        }
        self.selected_day = Some(day);
        self.reset_event_selection();
    }

    pub fn clear_selected_day(&mut self) {
        self.selected_day = None;
        self.reset_event_selection();
    }

    pub fn toggle_upcoming_only(&mut self) {
        self.filter.upcoming_only = !self.filter.upcoming_only;
        self.reset_event_selection();
    }

    pub fn cycle_type_filter(&mut self) {
        self.filter.type_filter = self.filter.type_filter.cycle();
        self.reset_event_selection();
    }

    pub fn selected_event(&self, now: DateTime<Utc>) -> Option<&EventItem> {
        self.listed_events(now).get(self.selected_event_index).copied()
    }

    pub fn move_event_selection_down(&mut self, now: DateTime<Utc>) {
        let count = self.listed_events(now).len();
        if count > 0 && self.selected_event_index < count - 1 {
            self.selected_event_index += 1;
        }
    }

    pub fn move_event_selection_up(&mut self) {
        self.selected_event_index = self.selected_event_index.saturating_sub(1);
    }

    pub fn reset_event_selection(&mut self) {
        self.selected_event_index = 0;
    }

    pub fn can_create(&self) -> bool {
        can_create_events(self.viewer.as_ref())
    }

    pub fn can_delete(&self, event: &EventItem) -> bool {
        can_delete_event(self.viewer.as_ref(), event)
    }

    /// Opens the confirmation dialog for the highlighted event when the
    /// viewer may delete it.
    pub fn request_delete(&mut self, now: DateTime<Utc>) {
        let target = self
            .selected_event(now)
            .filter(|ev| self.can_delete(ev) && !self.is_deleting(&ev.id))
            .map(|ev| ev.id.clone());
        if target.is_none() {
            self.notice = Some("No puedes eliminar este evento".to_string());
        }
        self.delete_confirmation_event_id = target;
    }

    /// Marks a row as being deleted. Returns false when a delete for the same
    /// row is already outstanding.
    pub fn begin_delete(&mut self, event_id: &str) -> bool {
        self.deleting.insert(event_id.to_string())
    }

    pub fn finish_delete(&mut self, event_id: &str, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => self.remove_event(event_id),
            Err(message) => {
                self.deleting.remove(event_id);
                self.events_error = Some(message);
            }
        }
    }

    pub fn is_deleting(&self, event_id: &str) -> bool {
        self.deleting.contains(event_id)
    }

    pub fn recipients(&self) -> Vec<Recipient> {
        merge_recipients(&self.users, &self.students)
    }

    pub fn search_recipients(&self, query: &str) -> Vec<Recipient> {
        let all = self.recipients();
        filter_recipients(&all, query).into_iter().cloned().collect()
    }

    /// People offered by the open form, narrowed by its search box.
    pub fn form_people(&self) -> Vec<Recipient> {
        let query = self
            .event_form
            .as_ref()
            .map(|form| form.recipient_query.as_str())
            .unwrap_or_default();
        self.search_recipients(query)
    }

    pub fn open_new_event_form(&mut self) {
        let form = match self.selected_day {
            Some(day) => EventForm::starting_on(day),
            None => EventForm::default(),
        };
        self.event_form = Some(form);
        self.mode = Mode::Insert;
    }

    pub fn open_duplicate_form(&mut self, now: DateTime<Utc>) {
        if let Some(form) = self.selected_event(now).map(|ev| EventForm::duplicate_of(ev, now)) {
            self.event_form = Some(form);
            self.mode = Mode::Insert;
        }
    }

    pub fn open_edit_form(&mut self, now: DateTime<Utc>) {
        if let Some(form) = self.selected_event(now).map(EventForm::edit_draft) {
            self.event_form = Some(form);
            self.mode = Mode::Insert;
        }
    }

    pub fn close_form(&mut self) {
        self.event_form = None;
        self.mode = Mode::Normal;
    }

    pub fn can_submit_form(&self) -> bool {
        self.event_form
            .as_ref()
            .is_some_and(|form| form.can_submit(self.saving))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    Start,
    End,
    Type,
    Description,
    Groups,
    People,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub event_type: EventType,
    pub user_selection: Selection,
    pub group_selection: Selection,
    pub active_field: FormField,
    pub list_cursor: usize,
    pub recipient_query: String,
    pub event_id: Option<String>,
}

impl Default for EventForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            start: String::new(),
            end: String::new(),
            event_type: EventType::Colegio,
            user_selection: Selection::default(),
            group_selection: Selection::default(),
            active_field: FormField::Title,
            list_cursor: 0,
            recipient_query: String::new(),
            event_id: None,
        }
    }
}

const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

impl EventForm {
    pub fn starting_on(day: NaiveDate) -> Self {
        let start = day
            .and_hms_opt(8, 0, 0)
            .map(|dt| dt.format(INPUT_FORMAT).to_string())
            .unwrap_or_default();
        Self { start, ..Self::default() }
    }

    /// Copy of `event` one week later, as a new event.
    pub fn duplicate_of(event: &EventItem, now: DateTime<Utc>) -> Self {
        let week = Duration::days(7);
        let start = event
            .start_date_time
            .as_deref()
            .and_then(parse_timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now)
            + week;
        let end = event.end_date().map(|dt| dt.with_timezone(&Utc) + week);

        Self {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            start: start.format(INPUT_FORMAT).to_string(),
            end: end.map(|dt| dt.format(INPUT_FORMAT).to_string()).unwrap_or_default(),
            event_type: event.event_type.clone(),
            user_selection: Selection::from_ids(event.audience.user_ids.clone()),
            group_selection: Selection::from_ids(event.audience.group_ids.clone()),
            ..Self::default()
        }
    }

    pub fn edit_draft(event: &EventItem) -> Self {
        // Saved times are read back as UTC; offsets are folded in first.
        let input_time = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| match parse_timestamp(v) {
                    Some(dt) => dt.with_timezone(&Utc).format(INPUT_FORMAT).to_string(),
                    None => v.chars().take(16).collect(),
                })
                .unwrap_or_default()
        };

        Self {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            start: input_time(&event.start_date_time),
            end: input_time(&event.end_date_time),
            event_type: event.event_type.clone(),
            user_selection: Selection::from_ids(event.audience.user_ids.clone()),
            group_selection: Selection::from_ids(event.audience.group_ids.clone()),
            event_id: Some(event.id.clone()),
            ..Self::default()
        }
    }

    pub fn is_editing(&self) -> bool {
        self.event_id.is_some()
    }

    pub fn can_submit(&self, saving: bool) -> bool {
        !saving && !self.title.trim().is_empty() && !self.start.trim().is_empty()
    }

    pub fn to_payload(&self) -> EventPayload {
        let end = self.end.trim();
        EventPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            start_date_time: to_iso_string(&self.start),
            end_date_time: (!end.is_empty()).then(|| to_iso_string(end)),
            event_type: self.event_type.clone(),
            audience: EventAudience {
                user_ids: self.user_selection.ids().to_vec(),
                group_ids: self.group_selection.ids().to_vec(),
            },
            id: self.event_id.clone(),
        }
    }

    pub fn next_field(&mut self) {
        self.active_field = match self.active_field {
            FormField::Title => FormField::Start,
            FormField::Start => FormField::End,
            FormField::End => FormField::Type,
            FormField::Type => FormField::Description,
            FormField::Description => FormField::Groups,
            FormField::Groups => FormField::People,
            FormField::People => FormField::Title,
        };
        self.list_cursor = 0;
    }

    pub fn prev_field(&mut self) {
        self.active_field = match self.active_field {
            FormField::Title => FormField::People,
            FormField::Start => FormField::Title,
            FormField::End => FormField::Start,
            FormField::Type => FormField::End,
            FormField::Description => FormField::Type,
            FormField::Groups => FormField::Description,
            FormField::People => FormField::Groups,
        };
        self.list_cursor = 0;
    }
}
