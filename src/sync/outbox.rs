use chrono::Utc;
use thiserror::Error;

use crate::messages::{ComposeError, Message, OutgoingMessage};
use crate::store::MessageState;
use crate::sync::api_client::{ApiError, MessagesApi};

const SEND_FALLBACK_MESSAGE: &str = "No se pudo enviar el mensaje";

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("{0}")]
    Invalid(#[from] ComposeError),
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl OutboxError {
    pub fn user_message(&self) -> String {
        match self {
            OutboxError::Invalid(e) => e.to_string(),
            OutboxError::Api(e) => e.user_message(SEND_FALLBACK_MESSAGE),
        }
    }
}

/// Sends `message` now, or schedules it when it carries a send time.
///
/// A draft sits in `state.drafts` while the request runs. On success it is
/// replaced by the server's copy (or the draft itself, relabelled, when the
/// server answers without a body). On failure the draft stays behind.
pub async fn deliver<A>(api: &A, state: &mut MessageState, message: &OutgoingMessage) -> Result<Message, OutboxError>
where
    A: MessagesApi + ?Sized,
{
    message.validate()?;

    let draft = message.to_draft(format!("draft-{}", Utc::now().timestamp_millis()));
    let draft_id = draft.id.clone();
    state.add_draft(draft.clone());

    let response = if message.is_scheduled() {
        api.schedule_message(message).await
    } else {
        api.send_message(message).await
    };

    let stored = match response {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!("Message delivery failed, keeping draft {}: {}", draft_id, e);
            return Err(e.into());
        }
    };

    state.remove_draft(&draft_id);
    let delivered = stored.unwrap_or_else(|| Message {
        status: Some(if message.is_scheduled() { "scheduled" } else { "sent" }.to_string()),
        ..draft
    });
    tracing::info!("Message {} accepted with status {:?}", delivered.id, delivered.status);
    state.add_message(delivered.clone());
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::api_client::MockMessagesApi;
    use pretty_assertions::assert_eq;

    fn outgoing() -> OutgoingMessage {
        OutgoingMessage {
            content: "Reunión el lunes".to_string(),
            recipients: vec!["a@x.com".to_string()],
            ..OutgoingMessage::default()
        }
    }

    #[tokio::test]
    async fn sent_message_replaces_the_draft() {
        let mut api = MockMessagesApi::new();
        api.expect_send_message().times(1).returning(|m| {
            Ok(Some(Message {
                id: "m1".to_string(),
                content: m.content.clone(),
                status: Some("sent".to_string()),
                ..Message::default()
            }))
        });
        api.expect_schedule_message().never();
        let mut state = MessageState::default();

        let delivered = deliver(&api, &mut state, &outgoing()).await.unwrap();

        assert_eq!(delivered.id, "m1");
        assert!(state.drafts.is_empty());
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].id, "m1");
    }

    #[tokio::test]
    async fn send_time_routes_to_schedule() {
        let mut api = MockMessagesApi::new();
        api.expect_send_message().never();
        api.expect_schedule_message().times(1).returning(|_| Ok(None));
        let mut state = MessageState::default();
        let message = OutgoingMessage {
            scheduled_at: Some("2024-06-12T08:00:00.000Z".to_string()),
            ..outgoing()
        };

        let delivered = deliver(&api, &mut state, &message).await.unwrap();

        assert_eq!(delivered.status.as_deref(), Some("scheduled"));
        assert!(delivered.id.starts_with("draft-"));
        assert!(state.drafts.is_empty());
        assert_eq!(state.messages[0].content, "Reunión el lunes");
    }

    #[tokio::test]
    async fn failed_send_keeps_the_draft() {
        let mut api = MockMessagesApi::new();
        api.expect_send_message().returning(|_| {
            Err(ApiError::ServerError {
                status: 422,
                message: Some("Destinatario inválido".to_string()),
                error: None,
            })
        });
        let mut state = MessageState::default();

        let err = deliver(&api, &mut state, &outgoing()).await.unwrap_err();

        assert_eq!(err.user_message(), "Destinatario inválido");
        assert_eq!(state.drafts.len(), 1);
        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn invalid_message_never_reaches_the_api() {
        let mut api = MockMessagesApi::new();
        api.expect_send_message().never();
        let mut state = MessageState::default();
        let empty = OutgoingMessage {
            content: " ".to_string(),
            ..outgoing()
        };

        let err = deliver(&api, &mut state, &empty).await.unwrap_err();

        assert!(matches!(err, OutboxError::Invalid(ComposeError::EmptyContent)));
        assert_eq!(err.user_message(), "El mensaje no puede estar vacío");
        assert!(state.drafts.is_empty());
    }
}
