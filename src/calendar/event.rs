use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Colegio,
    Evaluacion,
    Reunion,
    Other(String),
}

impl EventType {
    pub const CANONICAL: [EventType; 3] = [EventType::Colegio, EventType::Evaluacion, EventType::Reunion];

    /// Folds legacy aliases into the canonical set. Never fails: empty or
    /// missing input becomes `Colegio`, unknown values are kept as `Other`.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim).unwrap_or_default() {
            "" | "general" | "colegio" => EventType::Colegio,
            "schedule" | "evaluacion" => EventType::Evaluacion,
            "reunion" => EventType::Reunion,
            other => EventType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Colegio => "colegio",
            EventType::Evaluacion => "evaluacion",
            EventType::Reunion => "reunion",
            EventType::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Evaluacion => "Evaluación",
            EventType::Reunion => "Reunión apoderados",
            EventType::Colegio | EventType::Other(_) => "Evento colegio",
        }
    }

    pub fn next_canonical(&self) -> Self {
        match self {
            EventType::Colegio => EventType::Evaluacion,
            EventType::Evaluacion => EventType::Reunion,
            EventType::Reunion | EventType::Other(_) => EventType::Colegio,
        }
    }
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Colegio
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(EventType::normalize(raw.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAudience {
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

impl EventAudience {
    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.group_ids.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAudience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<String>>,
}

/// Event exactly as the API sends it. Both audience shapes are accepted here
/// and nowhere else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_user_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_group_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<RawAudience>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEvent", into = "RawEvent")]
pub struct EventItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub created_at: Option<String>,
    pub event_type: EventType,
    pub created_by_name: Option<String>,
    pub created_by_email: Option<String>,
    pub school_id: Option<String>,
    pub audience: EventAudience,
}

impl From<RawEvent> for EventItem {
    fn from(raw: RawEvent) -> Self {
        let nested = raw.audience.unwrap_or_default();
        let audience = EventAudience {
            user_ids: raw.audience_user_ids.or(nested.user_ids).unwrap_or_default(),
            group_ids: raw.audience_group_ids.or(nested.group_ids).unwrap_or_default(),
        };

        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            start_date_time: non_empty(raw.start_date_time),
            end_date_time: non_empty(raw.end_date_time),
            created_at: non_empty(raw.created_at),
            event_type: EventType::normalize(raw.event_type.as_deref()),
            created_by_name: raw.created_by_name,
            created_by_email: non_empty(raw.created_by_email).or_else(|| non_empty(raw.created_by)),
            school_id: non_empty(raw.school_id),
            audience,
        }
    }
}

impl From<EventItem> for RawEvent {
    fn from(event: EventItem) -> Self {
        RawEvent {
            id: event.id,
            title: event.title,
            description: event.description,
            start_date_time: event.start_date_time,
            end_date_time: event.end_date_time,
            created_at: event.created_at,
            event_type: Some(event.event_type.as_str().to_string()),
            created_by_name: event.created_by_name,
            created_by: None,
            created_by_email: event.created_by_email,
            school_id: event.school_id,
            audience_user_ids: Some(event.audience.user_ids.clone()),
            audience_group_ids: Some(event.audience.group_ids.clone()),
            audience: Some(RawAudience {
                user_ids: Some(event.audience.user_ids),
                group_ids: Some(event.audience.group_ids),
            }),
        }
    }
}

impl EventItem {
    pub fn to_raw(&self) -> RawEvent {
        RawEvent::from(self.clone())
    }

    /// Start timestamp, or the creation timestamp when the event has no start.
    pub fn effective_timestamp(&self) -> Option<&str> {
        self.start_date_time
            .as_deref()
            .or(self.created_at.as_deref())
    }

    pub fn effective_date(&self) -> Option<DateTime<FixedOffset>> {
        self.effective_timestamp().and_then(parse_timestamp)
    }

    pub fn day_key(&self) -> Option<NaiveDate> {
        self.effective_date().map(|dt| dt.date_naive())
    }

    pub fn end_date(&self) -> Option<DateTime<FixedOffset>> {
        self.end_date_time.as_deref().and_then(parse_timestamp)
    }

    /// Local stand-in built from a write payload, used when the create
    /// response carries no body.
    pub fn from_payload(payload: &EventPayload) -> Self {
        Self {
            id: payload.id.clone().unwrap_or_default(),
            title: payload.title.clone(),
            description: (!payload.description.is_empty()).then(|| payload.description.clone()),
            start_date_time: non_empty(Some(payload.start_date_time.clone())),
            end_date_time: payload.end_date_time.clone(),
            created_at: None,
            event_type: payload.event_type.clone(),
            created_by_name: None,
            created_by_email: None,
            school_id: None,
            audience: payload.audience.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub start_date_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub audience: EventAudience,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Parses the timestamp shapes the API and the form produce: RFC 3339,
/// offset-less date-times (read as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().with_timezone(&utc));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().with_timezone(&utc))
}

/// ISO-8601 in UTC with millisecond precision. Unparsable input is returned
/// unchanged so the server can report it.
pub fn to_iso_string(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true),
        None => value.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Timestamps arrive as ISO strings, but Instant fields may also be written as
// epoch seconds with a fractional part.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => n.as_f64().and_then(epoch_seconds_to_rfc3339),
        _ => None,
    })
}

fn epoch_seconds_to_rfc3339(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
