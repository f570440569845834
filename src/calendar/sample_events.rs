use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::calendar::{EventAudience, EventItem, EventType};

/// Fixed demo agenda shown when the event list cannot be loaded, so the page
/// stays usable offline. Never sent back to the API.
pub fn sample_events(now: DateTime<Utc>) -> Vec<EventItem> {
    let iso = |dt: DateTime<Utc>| dt.to_rfc3339_opts(SecondsFormat::Millis, true);

    vec![
        EventItem {
            id: "sample-1".to_string(),
            title: "Reunión de apoderados".to_string(),
            description: Some("Revisión de avances y notas del trimestre.".to_string()),
            start_date_time: Some(iso(now)),
            end_date_time: Some(iso(now + Duration::hours(1))),
            created_at: None,
            event_type: EventType::normalize(Some("general")),
            created_by_name: Some("Coordinación".to_string()),
            created_by_email: None,
            school_id: None,
            audience: EventAudience::default(),
        },
        EventItem {
            id: "sample-2".to_string(),
            title: "Horario de Matemáticas 4°B".to_string(),
            description: Some("Clases semanales de matemáticas (horario escolar).".to_string()),
            start_date_time: Some(iso(now)),
            end_date_time: None,
            created_at: None,
            event_type: EventType::normalize(Some("schedule")),
            created_by_name: Some("Prof. Gómez".to_string()),
            created_by_email: None,
            school_id: None,
            audience: EventAudience::default(),
        },
    ]
}

pub fn is_sample(event: &EventItem) -> bool {
    event.id.starts_with("sample-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sample_events_start_now_with_canonical_types() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();

        let events = sample_events(now);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::Colegio);
        assert_eq!(events[1].event_type, EventType::Evaluacion);
        assert!(events.iter().all(|e| e.effective_date().map(|d| d.with_timezone(&Utc)) == Some(now)));
        assert!(events.iter().all(is_sample));
    }
}
