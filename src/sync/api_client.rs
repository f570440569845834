use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::calendar::{AuthUser, DirectoryUser, EventItem, EventPayload, Group, School, Student};
use crate::messages::{Message, OutgoingMessage, Template};
use crate::storage::config::ApiConfig;
use crate::sync::session::TokenStorage;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Server responded with status {status}")]
    ServerError {
        status: u16,
        message: Option<String>,
        error: Option<String>,
    },
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ApiError {
    /// Text shown to the user: the server's `message`, then its `error`,
    /// then the transport error, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::ServerError { message, error, .. } => message
                .clone()
                .or_else(|| error.clone())
                .unwrap_or_else(|| fallback.to_string()),
            ApiError::HttpError(e) => e.to_string(),
            ApiError::AuthenticationFailed => "Tu sesión expiró. Inicia sesión nuevamente.".to_string(),
            ApiError::ParseError(_) => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::AuthenticationFailed)
    }

    fn from_error_body(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        ApiError::ServerError {
            status,
            message: field("message"),
            error: field("error"),
        }
    }
}

/// One page of a list endpoint. Endpoints answer either with a bare array or
/// with `{items, total?, hasMore?}`; both land here.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub has_more: Option<bool>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: None,
            has_more: None,
        }
    }
}

impl<T> Page<T> {
    pub fn bare(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Paged {
        #[serde(default = "Vec::new")]
        items: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default, rename = "hasMore")]
        has_more: Option<bool>,
    },
}

impl<T> From<ListBody<T>> for Page<T> {
    fn from(body: ListBody<T>) -> Self {
        match body {
            ListBody::Bare(items) => Page::bare(items),
            ListBody::Paged { items, total, has_more } => Page { items, total, has_more },
        }
    }
}

/// Filters shared by the student and group directories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryQuery {
    pub school_id: Option<String>,
    pub year: Option<i32>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl DirectoryQuery {
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(school_id) = &self.school_id {
            pairs.push(("schoolId", school_id.clone()));
        }
        if let Some(year) = self.year {
            pairs.push(("year", year.to_string()));
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize", page_size.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetrics {
    #[serde(default)]
    pub app_active_by_school: BTreeMap<String, u64>,
}

/// Calls the events page depends on. Kept as a trait so page loading can be
/// exercised without a server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn list_events(&self) -> Result<Vec<EventItem>, ApiError>;

    /// `None` when the server accepted the event but returned no body.
    async fn create_event(&self, payload: &EventPayload) -> Result<Option<EventItem>, ApiError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), ApiError>;

    async fn list_users(&self, page: u32, page_size: u32) -> Result<Page<DirectoryUser>, ApiError>;

    async fn list_groups(&self, query: &DirectoryQuery) -> Result<Vec<Group>, ApiError>;

    async fn list_students(&self, query: &DirectoryQuery) -> Result<Page<Student>, ApiError>;
}

/// Message composer calls. Sends and schedules fan out to many recipients on
/// the server, so they run under the bulk timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagesApi: Send + Sync {
    async fn get_message(&self, message_id: &str) -> Result<Message, ApiError>;

    async fn send_message(&self, message: &OutgoingMessage) -> Result<Option<Message>, ApiError>;

    async fn schedule_message(&self, message: &OutgoingMessage) -> Result<Option<Message>, ApiError>;

    async fn delete_message(&self, message_id: &str) -> Result<(), ApiError>;

    async fn list_templates(&self) -> Result<Vec<Template>, ApiError>;
}

pub struct HttpConsoleClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
    bulk_timeout: Duration,
    session: Option<TokenStorage>,
}

impl HttpConsoleClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
            bulk_timeout: config.bulk_timeout(),
            session: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Session file to wipe when the server answers 401.
    pub fn with_session_storage(mut self, storage: TokenStorage) -> Self {
        self.session = Some(storage);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder, what: &str) -> Result<String, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("{} request failed: {}", what, e);
            ApiError::from(e)
        })?;

        let status = response.status();
        tracing::info!("{} response status: {}", what, status);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("{} rejected with 401, clearing stored session", what);
            if let Some(storage) = &self.session {
                if let Err(e) = storage.clear() {
                    tracing::error!("Failed to clear stored session: {}", e);
                }
            }
            return Err(ApiError::AuthenticationFailed);
        }

        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("{} failed. Status: {}, Body: {}", what, status, body);
            return Err(ApiError::from_error_body(status.as_u16(), &body));
        }

        Ok(body)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        tracing::info!("Logging in as {}", email);
        let builder = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let body = self.execute(builder, "Login").await?;
        decode(&body)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, "/auth/logout"), "Logout").await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<AuthUser, ApiError> {
        let body = self.execute(self.request(Method::GET, "/auth/me"), "Current user").await?;
        decode(&body)
    }

    pub async fn list_messages(&self, year: Option<i32>) -> Result<Page<Message>, ApiError> {
        let mut builder = self.request(Method::GET, "/messages");
        if let Some(year) = year {
            builder = builder.query(&[("year", year.to_string())]);
        }
        let body = self.execute(builder, "List messages").await?;
        decode_page(&body)
    }

    pub async fn list_schools(&self) -> Result<Vec<School>, ApiError> {
        let body = self.execute(self.request(Method::GET, "/schools"), "List schools").await?;
        decode_page(&body).map(|page| page.items)
    }

    pub async fn usage_metrics(&self) -> Result<UsageMetrics, ApiError> {
        let body = self.execute(self.request(Method::GET, "/usage"), "Usage metrics").await?;
        decode_optional(&body).map(Option::unwrap_or_default)
    }
}

#[async_trait]
impl ConsoleApi for HttpConsoleClient {
    async fn list_events(&self) -> Result<Vec<EventItem>, ApiError> {
        let body = self.execute(self.request(Method::GET, "/events"), "List events").await?;
        let events = decode_page::<EventItem>(&body)?.items;
        tracing::info!("Fetched {} events", events.len());
        Ok(events)
    }

    async fn create_event(&self, payload: &EventPayload) -> Result<Option<EventItem>, ApiError> {
        tracing::info!("Creating event: {} on {}", payload.title, payload.start_date_time);
        tracing::debug!("POST /events with payload: {:?}", payload);
        let builder = self.request(Method::POST, "/events").json(payload);
        let body = self.execute(builder, "Create event").await?;
        decode_optional(&body)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ApiError> {
        let path = format!("/events/{}", urlencoding::encode(event_id));
        self.execute(self.request(Method::DELETE, &path), "Delete event").await?;
        tracing::info!("Event {} deleted", event_id);
        Ok(())
    }

    async fn list_users(&self, page: u32, page_size: u32) -> Result<Page<DirectoryUser>, ApiError> {
        let builder = self
            .request(Method::GET, "/users")
            .query(&[("page", page.to_string()), ("pageSize", page_size.to_string())]);
        let body = self.execute(builder, "List users").await?;
        decode_page(&body)
    }

    async fn list_groups(&self, query: &DirectoryQuery) -> Result<Vec<Group>, ApiError> {
        let builder = self.request(Method::GET, "/groups").query(&query.to_query());
        let body = self.execute(builder, "List groups").await?;
        decode_page(&body).map(|page| page.items)
    }

    async fn list_students(&self, query: &DirectoryQuery) -> Result<Page<Student>, ApiError> {
        let builder = self.request(Method::GET, "/students").query(&query.to_query());
        let body = self.execute(builder, "List students").await?;
        decode_page(&body)
    }
}

#[async_trait]
impl MessagesApi for HttpConsoleClient {
    async fn get_message(&self, message_id: &str) -> Result<Message, ApiError> {
        let path = format!("/messages/{}", urlencoding::encode(message_id));
        let body = self.execute(self.request(Method::GET, &path), "Get message").await?;
        decode(&body)
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<Option<Message>, ApiError> {
        tracing::info!("Sending message to {} recipients", message.recipients.len());
        let builder = self
            .request(Method::POST, "/messages/send")
            .timeout(self.bulk_timeout)
            .json(message);
        let body = self.execute(builder, "Send message").await?;
        decode_optional(&body)
    }

    async fn schedule_message(&self, message: &OutgoingMessage) -> Result<Option<Message>, ApiError> {
        tracing::info!("Scheduling message for {:?}", message.scheduled_at);
        let builder = self
            .request(Method::POST, "/messages/schedule")
            .timeout(self.bulk_timeout)
            .json(message);
        let body = self.execute(builder, "Schedule message").await?;
        decode_optional(&body)
    }

    async fn delete_message(&self, message_id: &str) -> Result<(), ApiError> {
        let path = format!("/messages/{}", urlencoding::encode(message_id));
        self.execute(self.request(Method::DELETE, &path), "Delete message").await?;
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<Template>, ApiError> {
        let body = self.execute(self.request(Method::GET, "/templates"), "List templates").await?;
        decode_page(&body).map(|page| page.items)
    }
}

fn is_blank_body(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.is_empty() || trimmed == "null"
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::ParseError(e.to_string()))
}

fn decode_optional<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    if is_blank_body(body) {
        return Ok(None);
    }
    decode(body).map(Some)
}

fn decode_page<T: DeserializeOwned>(body: &str) -> Result<Page<T>, ApiError> {
    if is_blank_body(body) {
        return Ok(Page::default());
    }
    decode::<ListBody<T>>(body).map(Page::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{EventAudience, EventType};
    use crate::sync::session::StoredSession;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            bulk_timeout_seconds: 30,
        }
    }

    fn client(server: &MockServer) -> HttpConsoleClient {
        HttpConsoleClient::new(&config(&server.uri())).unwrap().with_token("tok")
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = HttpConsoleClient::new(&config("http://localhost:8080/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn bare_and_paged_bodies_decode_to_pages() {
        let bare: Page<School> = decode_page(r#"[{"id":"s1","name":"Liceo"}]"#).unwrap();
        assert_eq!(bare.items.len(), 1);
        assert_eq!(bare.total, None);

        let paged: Page<School> =
            decode_page(r#"{"items":[{"id":"s1"}],"total":40,"hasMore":true}"#).unwrap();
        assert_eq!(paged.total, Some(40));
        assert_eq!(paged.has_more, Some(true));

        let empty: Page<School> = decode_page("  ").unwrap();
        assert!(empty.items.is_empty());
        let null: Page<School> = decode_page("null").unwrap();
        assert!(null.items.is_empty());
    }

    #[test]
    fn user_message_prefers_message_then_error_then_fallback() {
        let both = ApiError::from_error_body(400, r#"{"message":"Título requerido","error":"Bad Request"}"#);
        assert_eq!(both.user_message("No se pudo guardar"), "Título requerido");

        let only_error = ApiError::from_error_body(500, r#"{"error":"Internal Server Error"}"#);
        assert_eq!(only_error.user_message("No se pudo guardar"), "Internal Server Error");

        let html = ApiError::from_error_body(502, "<html>Bad gateway</html>");
        assert_eq!(html.user_message("No se pudo guardar"), "No se pudo guardar");

        let blank = ApiError::from_error_body(400, r#"{"message":"  "}"#);
        assert_eq!(blank.user_message("No se pudo guardar"), "No se pudo guardar");
    }

    #[test]
    fn directory_query_uses_camel_case_params() {
        let query = DirectoryQuery {
            school_id: Some("s1".to_string()),
            year: Some(2024),
            q: Some("  ".to_string()),
            ..DirectoryQuery::default()
        }
        .page(2, 500);

        assert_eq!(
            query.to_query(),
            vec![
                ("schoolId", "s1".to_string()),
                ("year", "2024".to_string()),
                ("page", "2".to_string()),
                ("pageSize", "500".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn list_events_sends_bearer_token_and_normalizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "e1",
                    "title": "Prueba",
                    "startDateTime": "2024-06-10T10:00:00Z",
                    "type": "schedule",
                    "audience": {"groupIds": ["g1"]}
                }
            ])))
            .mount(&server)
            .await;

        let events = client(&server).list_events().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Evaluacion);
        assert_eq!(events[0].audience.group_ids, vec!["g1".to_string()]);
        assert!(events[0].audience.user_ids.is_empty());
    }

    #[tokio::test]
    async fn list_events_accepts_paged_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "e1", "title": "Uno"}, {"id": "e2", "title": "Dos"}],
                "total": 2
            })))
            .mount(&server)
            .await;

        let events = client(&server).list_events().await.unwrap();

        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn unauthorized_clears_stored_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let session_path = temp_dir.path().join("session.json");
        let storage = TokenStorage::new(session_path.clone());
        storage.save(&StoredSession::new("tok".to_string(), None)).unwrap();

        let result = client(&server)
            .with_session_storage(storage)
            .list_events()
            .await;

        assert!(matches!(result, Err(ApiError::AuthenticationFailed)));
        assert!(!session_path.exists());
    }

    #[tokio::test]
    async fn server_error_carries_message_field() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/events/e1"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "No autorizado para eliminar"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).delete_event("e1").await.unwrap_err();

        assert!(matches!(err, ApiError::ServerError { status: 403, .. }));
        assert_eq!(err.user_message("No se pudo eliminar"), "No autorizado para eliminar");
    }

    #[tokio::test]
    async fn create_event_posts_payload_and_tolerates_empty_body() {
        let server = MockServer::start().await;
        let payload = EventPayload {
            title: "Consejo".to_string(),
            description: String::new(),
            start_date_time: "2024-06-10T08:00:00.000Z".to_string(),
            end_date_time: None,
            event_type: EventType::Reunion,
            audience: EventAudience {
                user_ids: vec!["a@x.com".to_string()],
                group_ids: vec![],
            },
            id: None,
        };
        Mock::given(method("POST"))
            .and(path("/events"))
            .and(body_json(json!({
                "title": "Consejo",
                "description": "",
                "startDateTime": "2024-06-10T08:00:00.000Z",
                "type": "reunion",
                "audience": {"userIds": ["a@x.com"], "groupIds": []}
            })))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let created = client(&server).create_event(&payload).await.unwrap();

        assert_eq!(created, None);
    }

    #[tokio::test]
    async fn list_students_forwards_directory_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/students"))
            .and(query_param("schoolId", "s1"))
            .and(query_param("page", "1"))
            .and(query_param("pageSize", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "st1", "firstName": "Ana", "lastNameFather": "Rojas"}],
                "total": 1,
                "hasMore": false
            })))
            .mount(&server)
            .await;

        let query = DirectoryQuery {
            school_id: Some("s1".to_string()),
            ..DirectoryQuery::default()
        }
        .page(1, 500);
        let page = client(&server).list_students(&query).await.unwrap();

        assert_eq!(page.items[0].display_name(), "Ana Rojas");
        assert_eq!(page.has_more, Some(false));
    }

    #[tokio::test]
    async fn login_decodes_token_user_and_students() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "a@x.com", "password": "secreto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "jwt",
                "user": {"id": "u1", "email": "a@x.com", "role": "ADMIN", "schoolId": "s1"},
                "students": []
            })))
            .mount(&server)
            .await;

        let client = HttpConsoleClient::new(&config(&server.uri())).unwrap();
        let auth = client.login("a@x.com", "secreto").await.unwrap();

        assert_eq!(auth.token, "jwt");
        assert_eq!(auth.user.unwrap().school_id.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn usage_metrics_default_when_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usage"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let usage = client(&server).usage_metrics().await.unwrap();

        assert!(usage.app_active_by_school.is_empty());
    }

    fn tight_client(server: &MockServer) -> HttpConsoleClient {
        let config = ApiConfig {
            base_url: server.uri(),
            timeout_seconds: 1,
            bulk_timeout_seconds: 5,
        };
        HttpConsoleClient::new(&config).unwrap().with_token("tok")
    }

    #[tokio::test]
    async fn send_message_runs_under_the_bulk_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages/send"))
            .and(body_json(json!({"content": "Reunión el lunes", "recipients": ["a@x.com"]})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "m1", "content": "Reunión el lunes", "status": "sent"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        let message = OutgoingMessage {
            content: "Reunión el lunes".to_string(),
            recipients: vec!["a@x.com".to_string()],
            ..OutgoingMessage::default()
        };

        let sent = tight_client(&server).send_message(&message).await.unwrap();

        assert_eq!(sent.map(|m| m.id), Some("m1".to_string()));
    }

    #[tokio::test]
    async fn regular_calls_keep_the_default_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = tight_client(&server).list_templates().await.unwrap_err();

        assert!(matches!(err, ApiError::HttpError(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn schedule_message_posts_the_send_time() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages/schedule"))
            .and(body_json(json!({
                "content": "Recordatorio",
                "recipients": [],
                "groupIds": ["g1"],
                "scheduledAt": "2024-06-12T08:00:00.000Z"
            })))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        let message = OutgoingMessage {
            content: "Recordatorio".to_string(),
            group_ids: vec!["g1".to_string()],
            scheduled_at: Some("2024-06-12T08:00:00.000Z".to_string()),
            ..OutgoingMessage::default()
        };

        let scheduled = client(&server).schedule_message(&message).await.unwrap();

        assert_eq!(scheduled, None);
    }

    #[tokio::test]
    async fn message_lookup_and_delete_hit_the_message_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m1", "status": "failed"})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/messages/m1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&server);

        let message = client.get_message("m1").await.unwrap();
        client.delete_message("m1").await.unwrap();

        assert_eq!(message.status.as_deref(), Some("failed"));
    }
}
