use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::app::AppState;
use crate::calendar::sample_events::{is_sample, sample_events};
use crate::calendar::{DirectoryUser, EventItem, EventPayload, Group, Student};
use crate::storage::config::Config;
use crate::sync::api_client::{ApiError, ConsoleApi, DirectoryQuery, HttpConsoleClient};
use crate::sync::session::{SessionError, StoredSession, TokenStorage};

pub const USER_PAGE_SIZE: u32 = 100;
pub const MAX_USER_PAGES: u32 = 20;
pub const STUDENT_PAGE_SIZE: u32 = 500;
pub const MAX_STUDENT_PAGES: u32 = 10;

pub const EVENTS_FALLBACK_MESSAGE: &str = "No pudimos cargar los eventos";
const DELETE_FALLBACK_MESSAGE: &str = "No se pudo eliminar el evento";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Builds an authenticated client from the stored session.
pub fn open_session(config: &Config) -> Result<(HttpConsoleClient, StoredSession), LoadError> {
    let storage = TokenStorage::new(config.session.token_cache.clone());
    let session = storage.load()?;
    let client = HttpConsoleClient::new(&config.api)?
        .with_token(session.token.clone())
        .with_session_storage(storage);
    Ok((client, session))
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventsLoad {
    pub events: Vec<EventItem>,
    pub error: Option<String>,
    pub used_samples: bool,
}

impl EventsLoad {
    pub fn apply(self, state: &mut AppState) {
        state.replace_events(self.events, self.error);
    }
}

/// Loads the event list. A failed load is replaced by the demo agenda plus
/// a banner message, so the page never ends up empty because of the API.
pub async fn load_events<A>(api: &A, now: DateTime<Utc>) -> EventsLoad
where
    A: ConsoleApi + ?Sized,
{
    match api.list_events().await {
        Ok(events) => EventsLoad {
            events,
            error: None,
            used_samples: false,
        },
        Err(e) => {
            tracing::warn!("Event load failed, showing sample events: {}", e);
            EventsLoad {
                events: sample_events(now),
                error: Some(e.user_message(EVENTS_FALLBACK_MESSAGE)),
                used_samples: true,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientsLoad {
    pub users: Vec<DirectoryUser>,
    pub groups: Vec<Group>,
    pub students: Vec<Student>,
    pub errors: Vec<String>,
}

impl RecipientsLoad {
    pub fn apply(self, state: &mut AppState) {
        state.users = self.users;
        state.groups = self.groups;
        state.students = self.students;
        state.recipient_errors = self.errors;
        state.loading_recipients = false;
    }
}

/// Loads the three recipient directories concurrently. A failing source
/// leaves only its own list empty.
pub async fn load_recipients<A>(api: &A, query: &DirectoryQuery) -> RecipientsLoad
where
    A: ConsoleApi + ?Sized,
{
    let (users, groups, students) = tokio::join!(
        fetch_all_users(api),
        api.list_groups(query),
        fetch_all_students(api, query),
    );

    let mut load = RecipientsLoad::default();
    match users {
        Ok(users) => load.users = users,
        Err(e) => {
            tracing::warn!("User directory failed to load: {}", e);
            load.errors.push(e.user_message("No se pudieron cargar los usuarios"));
        }
    }
    match groups {
        Ok(groups) => load.groups = groups,
        Err(e) => {
            tracing::warn!("Group directory failed to load: {}", e);
            load.errors.push(e.user_message("No se pudieron cargar los grupos"));
        }
    }
    match students {
        Ok(students) => load.students = students,
        Err(e) => {
            tracing::warn!("Student directory failed to load: {}", e);
            load.errors.push(e.user_message("No se pudieron cargar los alumnos"));
        }
    }

    tracing::info!(
        "Loaded {} users, {} groups, {} students",
        load.users.len(),
        load.groups.len(),
        load.students.len()
    );
    load
}

pub async fn fetch_all_users<A>(api: &A) -> Result<Vec<DirectoryUser>, ApiError>
where
    A: ConsoleApi + ?Sized,
{
    let mut users = Vec::new();
    for page in 1..=MAX_USER_PAGES {
        let batch = api.list_users(page, USER_PAGE_SIZE).await?;
        let received = batch.items.len();
        users.extend(batch.items);
        if is_last_page(received, USER_PAGE_SIZE, batch.has_more, batch.total, users.len()) {
            return Ok(users);
        }
    }
    tracing::warn!("User directory truncated at {} pages", MAX_USER_PAGES);
    Ok(users)
}

pub async fn fetch_all_students<A>(api: &A, base: &DirectoryQuery) -> Result<Vec<Student>, ApiError>
where
    A: ConsoleApi + ?Sized,
{
    let mut students = Vec::new();
    for page in 1..=MAX_STUDENT_PAGES {
        let query = base.clone().page(page, STUDENT_PAGE_SIZE);
        let batch = api.list_students(&query).await?;
        let received = batch.items.len();
        students.extend(batch.items);
        if is_last_page(received, STUDENT_PAGE_SIZE, batch.has_more, batch.total, students.len()) {
            return Ok(students);
        }
    }
    tracing::warn!("Student directory truncated at {} pages", MAX_STUDENT_PAGES);
    Ok(students)
}

fn is_last_page(received: usize, page_size: u32, has_more: Option<bool>, total: Option<u64>, collected: usize) -> bool {
    if has_more == Some(false) || received < page_size as usize {
        return true;
    }
    total.is_some_and(|t| collected as u64 >= t)
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(EventItem),
    Reloaded(Vec<EventItem>),
}

impl CreateOutcome {
    pub fn apply(self, state: &mut AppState) {
        match self {
            CreateOutcome::Created(event) => state.add_created_event(event),
            CreateOutcome::Reloaded(events) => state.replace_events(events, None),
        }
    }
}

/// Creates an event. When the server answers without a body the list is
/// reloaded; if that reload fails too, a local copy of the payload is shown.
pub async fn create_event<A>(api: &A, payload: &EventPayload) -> Result<CreateOutcome, ApiError>
where
    A: ConsoleApi + ?Sized,
{
    match api.create_event(payload).await? {
        Some(event) => Ok(CreateOutcome::Created(event)),
        None => match api.list_events().await {
            Ok(events) => Ok(CreateOutcome::Reloaded(events)),
            Err(e) => {
                tracing::warn!("Reload after create failed, keeping local copy: {}", e);
                Ok(CreateOutcome::Created(EventItem::from_payload(payload)))
            }
        },
    }
}

/// Closes the confirmation and flags the row as being deleted. Returns false
/// when a delete of the same row is already outstanding.
pub fn start_delete(state: &mut AppState, event_id: &str) -> bool {
    state.delete_confirmation_event_id = None;
    if !state.begin_delete(event_id) {
        tracing::debug!("Delete of {} already in progress", event_id);
        return false;
    }
    true
}

/// Sends the delete for a row flagged by `start_delete` and applies the
/// outcome. Demo rows never existed on the server and are dropped locally.
pub async fn finish_delete<A>(api: &A, state: &mut AppState, event_id: &str) -> bool
where
    A: ConsoleApi + ?Sized,
{
    if state.find_event(event_id).is_some_and(is_sample) {
        tracing::info!("Removing sample event {} locally", event_id);
        state.finish_delete(event_id, Ok(()));
        return true;
    }

    let outcome = api
        .delete_event(event_id)
        .await
        .map_err(|e| e.user_message(DELETE_FALLBACK_MESSAGE));
    let deleted = outcome.is_ok();
    state.finish_delete(event_id, outcome);
    deleted
}

/// Runs a confirmed delete. Returns false when a delete of the same row is
/// already outstanding or the API refused it.
pub async fn delete_event<A>(api: &A, state: &mut AppState, event_id: &str) -> bool
where
    A: ConsoleApi + ?Sized,
{
    if !start_delete(state, event_id) {
        return false;
    }
    finish_delete(api, state, event_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{EventAudience, EventType};
    use crate::sync::api_client::{MockConsoleApi, Page};
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn event(id: &str) -> EventItem {
        EventItem {
            id: id.to_string(),
            title: "Evento".to_string(),
            description: None,
            start_date_time: Some("2024-06-10T10:00:00Z".to_string()),
            end_date_time: None,
            created_at: None,
            event_type: EventType::Colegio,
            created_by_name: None,
            created_by_email: None,
            school_id: None,
            audience: EventAudience::default(),
        }
    }

    fn payload() -> EventPayload {
        EventPayload {
            title: "Consejo".to_string(),
            description: String::new(),
            start_date_time: "2024-06-10T08:00:00.000Z".to_string(),
            end_date_time: None,
            event_type: EventType::Colegio,
            audience: EventAudience::default(),
            id: None,
        }
    }

    fn users(count: usize) -> Vec<DirectoryUser> {
        (0..count)
            .map(|i| DirectoryUser {
                id: format!("u{}", i),
                ..DirectoryUser::default()
            })
            .collect()
    }

    fn server_error() -> ApiError {
        ApiError::ServerError {
            status: 500,
            message: Some("caído".to_string()),
            error: None,
        }
    }

    #[tokio::test]
    async fn failed_event_load_falls_back_to_samples() {
        let mut api = MockConsoleApi::new();
        api.expect_list_events().returning(|| Err(server_error()));

        let load = load_events(&api, now()).await;

        assert!(load.used_samples);
        assert_eq!(load.events.len(), 2);
        assert_eq!(load.error.as_deref(), Some("caído"));
    }

    #[tokio::test]
    async fn failed_event_load_without_server_text_uses_fallback() {
        let mut api = MockConsoleApi::new();
        api.expect_list_events().returning(|| {
            Err(ApiError::ServerError {
                status: 502,
                message: None,
                error: None,
            })
        });

        let load = load_events(&api, now()).await;

        assert!(load.used_samples);
        assert_eq!(load.error.as_deref(), Some(EVENTS_FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn successful_event_load_has_no_banner() {
        let mut api = MockConsoleApi::new();
        api.expect_list_events().returning(|| Ok(vec![event("e1")]));

        let load = load_events(&api, now()).await;

        assert!(!load.used_samples);
        assert_eq!(load.error, None);
        assert_eq!(load.events[0].id, "e1");
    }

    #[tokio::test]
    async fn failing_group_source_leaves_other_lists_loaded() {
        let mut api = MockConsoleApi::new();
        api.expect_list_users().returning(|_, _| Ok(Page::bare(users(2))));
        api.expect_list_groups().returning(|_| Err(server_error()));
        api.expect_list_students().returning(|_| {
            Ok(Page::bare(vec![Student {
                id: "st1".to_string(),
                first_name: "Ana".to_string(),
                ..Student::default()
            }]))
        });

        let load = load_recipients(&api, &DirectoryQuery::default()).await;

        assert_eq!(load.users.len(), 2);
        assert!(load.groups.is_empty());
        assert_eq!(load.students.len(), 1);
        assert_eq!(load.errors, vec!["caído".to_string()]);
    }

    #[tokio::test]
    async fn user_pagination_stops_on_short_page() {
        let mut api = MockConsoleApi::new();
        api.expect_list_users()
            .times(2)
            .returning(|page, size| {
                let count = if page == 1 { size as usize } else { 3 };
                Ok(Page::bare(users(count)))
            });

        let all = fetch_all_users(&api).await.unwrap();

        assert_eq!(all.len(), USER_PAGE_SIZE as usize + 3);
    }

    #[tokio::test]
    async fn user_pagination_is_capped() {
        let mut api = MockConsoleApi::new();
        api.expect_list_users()
            .times(MAX_USER_PAGES as usize)
            .returning(|_, size| {
                Ok(Page {
                    items: users(size as usize),
                    total: None,
                    has_more: Some(true),
                })
            });

        let all = fetch_all_users(&api).await.unwrap();

        assert_eq!(all.len(), (MAX_USER_PAGES * USER_PAGE_SIZE) as usize);
    }

    #[tokio::test]
    async fn student_pagination_respects_has_more_and_query() {
        let mut api = MockConsoleApi::new();
        api.expect_list_students()
            .times(1)
            .returning(|query| {
                assert_eq!(query.page, Some(1));
                assert_eq!(query.page_size, Some(STUDENT_PAGE_SIZE));
                assert_eq!(query.school_id.as_deref(), Some("s1"));
                Ok(Page {
                    items: vec![Student {
                        id: "st1".to_string(),
                        ..Student::default()
                    }],
                    total: Some(1),
                    has_more: Some(false),
                })
            });

        let base = DirectoryQuery {
            school_id: Some("s1".to_string()),
            ..DirectoryQuery::default()
        };
        let all = fetch_all_students(&api, &base).await.unwrap();

        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn created_event_is_returned_as_is() {
        let mut api = MockConsoleApi::new();
        api.expect_create_event().returning(|_| Ok(Some(event("new"))));

        let outcome = create_event(&api, &payload()).await.unwrap();

        assert_eq!(outcome, CreateOutcome::Created(event("new")));
    }

    #[tokio::test]
    async fn bodiless_create_reloads_the_list() {
        let mut api = MockConsoleApi::new();
        api.expect_create_event().returning(|_| Ok(None));
        api.expect_list_events().returning(|| Ok(vec![event("a"), event("b")]));

        let outcome = create_event(&api, &payload()).await.unwrap();

        assert!(matches!(outcome, CreateOutcome::Reloaded(ref events) if events.len() == 2));
    }

    #[tokio::test]
    async fn bodiless_create_with_failed_reload_keeps_local_copy() {
        let mut api = MockConsoleApi::new();
        api.expect_create_event().returning(|_| Ok(None));
        api.expect_list_events().returning(|| Err(server_error()));

        let outcome = create_event(&api, &payload()).await.unwrap();

        match outcome {
            CreateOutcome::Created(event) => assert_eq!(event.title, "Consejo"),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn confirmed_delete_removes_the_row() {
        let mut api = MockConsoleApi::new();
        api.expect_delete_event().times(1).returning(|_| Ok(()));
        let mut state = AppState::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        state.replace_events(vec![event("e1")], None);
        state.delete_confirmation_event_id = Some("e1".to_string());

        assert!(delete_event(&api, &mut state, "e1").await);
        assert!(state.events.is_empty());
        assert_eq!(state.delete_confirmation_event_id, None);
    }

    #[tokio::test]
    async fn refused_delete_keeps_the_row_and_reports() {
        let mut api = MockConsoleApi::new();
        api.expect_delete_event().returning(|_| {
            Err(ApiError::ServerError {
                status: 403,
                message: None,
                error: Some("Forbidden".to_string()),
            })
        });
        let mut state = AppState::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        state.replace_events(vec![event("e1")], None);

        assert!(!delete_event(&api, &mut state, "e1").await);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events_error.as_deref(), Some("Forbidden"));
        assert!(!state.is_deleting("e1"));
    }

    #[tokio::test]
    async fn outstanding_delete_is_not_repeated() {
        let mut api = MockConsoleApi::new();
        api.expect_delete_event().times(0);
        let mut state = AppState::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        state.replace_events(vec![event("e1")], None);
        state.begin_delete("e1");

        assert!(!delete_event(&api, &mut state, "e1").await);
    }

    #[tokio::test]
    async fn row_is_flagged_before_the_request_goes_out() {
        let mut api = MockConsoleApi::new();
        api.expect_delete_event().times(1).returning(|_| Ok(()));
        let mut state = AppState::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        state.replace_events(vec![event("e1")], None);
        state.delete_confirmation_event_id = Some("e1".to_string());

        assert!(start_delete(&mut state, "e1"));
        assert!(state.is_deleting("e1"));
        assert_eq!(state.delete_confirmation_event_id, None);
        assert!(!start_delete(&mut state, "e1"));

        assert!(finish_delete(&api, &mut state, "e1").await);
        assert!(!state.is_deleting("e1"));
        assert!(state.events.is_empty());
    }

    #[tokio::test]
    async fn sample_rows_are_removed_without_the_api() {
        let mut api = MockConsoleApi::new();
        api.expect_delete_event().never();
        let mut state = AppState::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        state.replace_events(sample_events(now()), None);

        assert!(delete_event(&api, &mut state, "sample-1").await);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events[0].id, "sample-2");
    }

    #[test]
    fn recipients_load_applies_to_state() {
        let mut state = AppState::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        state.loading_recipients = true;

        RecipientsLoad {
            users: users(1),
            ..RecipientsLoad::default()
        }
        .apply(&mut state);

        assert!(!state.loading_recipients);
        assert_eq!(state.recipients().len(), 1);
    }
}
