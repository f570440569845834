use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::app::AppState;
use crate::calendar::EventItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    Empty,
    Day(NaiveDate),
}

impl CalendarCell {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            CalendarCell::Empty => None,
            CalendarCell::Day(date) => Some(*date),
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month_first
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(0)
}

/// Monday-first grid for the month containing `reference`: leading blanks,
/// one cell per day, trailing blanks up to a multiple of seven.
pub fn build_month_grid(reference: NaiveDate) -> Vec<CalendarCell> {
    let (year, month) = (reference.year(), reference.month());
    let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let leading = first_day.weekday().num_days_from_monday() as usize;
    let mut cells = vec![CalendarCell::Empty; leading];

    cells.extend(
        (1..=days_in_month(year, month))
            .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .map(CalendarCell::Day),
    );

    while cells.len() % 7 != 0 {
        cells.push(CalendarCell::Empty);
    }
    cells
}

/// Groups events by the calendar day of their effective date, keeping
/// arrival order within a day. Events without a usable date are skipped.
pub fn events_by_day<'a, I>(events: I) -> BTreeMap<NaiveDate, Vec<&'a EventItem>>
where
    I: IntoIterator<Item = &'a EventItem>,
{
    let mut map: BTreeMap<NaiveDate, Vec<&EventItem>> = BTreeMap::new();
    for event in events {
        if let Some(day) = event.day_key() {
            map.entry(day).or_default().push(event);
        }
    }
    map
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Week {
    pub days: Vec<DayCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: Option<NaiveDate>,
    pub is_selected: bool,
    pub is_today: bool,
    pub event_count: usize,
}

pub fn calculate_layout(state: &AppState, today: NaiveDate) -> MonthLayout {
    let cursor = state.month_cursor;
    let by_day = events_by_day(state.filtered_events());

    let weeks = build_month_grid(cursor)
        .chunks(7)
        .map(|chunk| Week {
            days: chunk
                .iter()
                .map(|cell| {
                    let date = cell.date();
                    DayCell {
                        date,
                        is_selected: date.is_some() && date == state.selected_day,
                        is_today: date == Some(today),
                        event_count: date
                            .and_then(|d| by_day.get(&d))
                            .map_or(0, Vec::len),
                    }
                })
                .collect(),
        })
        .collect();

    MonthLayout {
        year: cursor.year(),
        month: cursor.month(),
        weeks,
    }
}
