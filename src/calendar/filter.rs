use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::calendar::{EventItem, EventType};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(EventType),
}

impl TypeFilter {
    pub fn matches(&self, event_type: &EventType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => wanted == event_type,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => TypeFilter::All,
            other => TypeFilter::Only(EventType::normalize(Some(other))),
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            TypeFilter::All => TypeFilter::Only(EventType::Colegio),
            TypeFilter::Only(EventType::Colegio) => TypeFilter::Only(EventType::Evaluacion),
            TypeFilter::Only(EventType::Evaluacion) => TypeFilter::Only(EventType::Reunion),
            TypeFilter::Only(_) => TypeFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "Todos",
            TypeFilter::Only(t) => t.label(),
        }
    }
}

/// Relative time window around "now": `[now - before, now + after]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub before: Duration,
    pub after: Duration,
}

impl Window {
    pub const fn new(before: Duration, after: Duration) -> Self {
        Self { before, after }
    }

    pub fn upcoming() -> Self {
        Self::new(Duration::hours(24), Duration::days(14))
    }

    pub fn upcoming_week() -> Self {
        Self::new(Duration::hours(24), Duration::days(7))
    }

    pub fn contains(&self, now: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        at >= now - self.before && at <= now + self.after
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::upcoming()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    pub year: i32,
    pub query: String,
    pub type_filter: TypeFilter,
    pub upcoming_only: bool,
    pub window: Window,
}

impl EventFilter {
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            query: String::new(),
            type_filter: TypeFilter::All,
            upcoming_only: true,
            window: Window::upcoming(),
        }
    }
}

pub fn in_year(event: &EventItem, year: i32) -> bool {
    match event.effective_date() {
        Some(date) => date.year() == year,
        None => {
            tracing::debug!("Dropping event {} with unparsable date {:?}", event.id, event.effective_timestamp());
            false
        }
    }
}

pub fn matches_text(event: &EventItem, query: &str) -> bool {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    event.title.to_lowercase().contains(&term)
        || event
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&term))
}

pub fn in_window(event: &EventItem, window: &Window, now: DateTime<Utc>) -> bool {
    event
        .effective_date()
        .is_some_and(|date| window.contains(now, date.with_timezone(&Utc)))
}

/// Year, text and type filters, sorted by effective date. Ties keep their
/// original relative order.
pub fn filter_events<'a>(events: &'a [EventItem], filter: &EventFilter) -> Vec<&'a EventItem> {
    let mut filtered: Vec<&EventItem> = events
        .iter()
        .filter(|ev| in_year(ev, filter.year))
        .filter(|ev| matches_text(ev, &filter.query))
        .filter(|ev| filter.type_filter.matches(&ev.event_type))
        .collect();
    filtered.sort_by_key(|ev| ev.effective_date());
    filtered
}

/// `filter_events` narrowed to the upcoming window when it is enabled.
pub fn visible_events<'a>(
    events: &'a [EventItem],
    filter: &EventFilter,
    now: DateTime<Utc>,
) -> Vec<&'a EventItem> {
    let filtered = filter_events(events, filter);
    if !filter.upcoming_only {
        return filtered;
    }
    filtered
        .into_iter()
        .filter(|ev| in_window(ev, &filter.window, now))
        .collect()
}

pub fn upcoming_week<'a>(events: &'a [EventItem], now: DateTime<Utc>) -> Vec<&'a EventItem> {
    let window = Window::upcoming_week();
    let mut week: Vec<&EventItem> = events
        .iter()
        .filter(|ev| in_window(ev, &window, now))
        .collect();
    week.sort_by_key(|ev| ev.effective_date());
    week
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventStats {
    pub total: usize,
    pub upcoming: usize,
    pub today: usize,
}

pub fn event_stats(
    events: &[EventItem],
    filter: &EventFilter,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> EventStats {
    let cutoff = now - filter.window.before;
    let upcoming = filter_events(events, filter)
        .into_iter()
        .filter(|ev| ev.effective_date().is_some_and(|d| d.with_timezone(&Utc) >= cutoff))
        .count();
    let today_count = events
        .iter()
        .filter(|ev| ev.day_key() == Some(today))
        .count();

    EventStats {
        total: events.len(),
        upcoming,
        today: today_count,
    }
}
