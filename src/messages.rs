use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::parse_timestamp;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub email_status: Option<String>,
    #[serde(default)]
    pub app_status: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub school_id: Option<String>,
}

/// Body for `POST /messages/send` and `POST /messages/schedule`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub content: String,
    pub recipients: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("El mensaje no puede estar vacío")]
    EmptyContent,
    #[error("Selecciona al menos un destinatario")]
    NoRecipients,
    #[error("Fecha de envío inválida: {0}")]
    InvalidSchedule(String),
}

impl OutgoingMessage {
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_at.is_some()
    }

    /// Content must be non-blank and there must be at least one person or
    /// group. A send time, when present, must parse.
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.content.trim().is_empty() {
            return Err(ComposeError::EmptyContent);
        }
        if self.recipients.is_empty() && self.group_ids.is_empty() {
            return Err(ComposeError::NoRecipients);
        }
        match &self.scheduled_at {
            Some(at) if parse_timestamp(at).is_none() => Err(ComposeError::InvalidSchedule(at.clone())),
            _ => Ok(()),
        }
    }

    /// Local copy kept in the outbox while the request is in flight.
    pub fn to_draft(&self, id: String) -> Message {
        Message {
            id,
            content: self.content.clone(),
            created_at: self.scheduled_at.clone(),
            status: Some("draft".to_string()),
            recipients: self.recipients.clone(),
            ..Message::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Pending,
    Read,
    Scheduled,
    Draft,
}

impl DeliveryStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sent" | "delivered" => Some(DeliveryStatus::Sent),
            "failed" => Some(DeliveryStatus::Failed),
            "pending" => Some(DeliveryStatus::Pending),
            "read" => Some(DeliveryStatus::Read),
            "scheduled" => Some(DeliveryStatus::Scheduled),
            "draft" => Some(DeliveryStatus::Draft),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "Enviado",
            DeliveryStatus::Failed => "Falló",
            DeliveryStatus::Pending => "Pendiente",
            DeliveryStatus::Read => "Leído",
            DeliveryStatus::Scheduled => "Programado",
            DeliveryStatus::Draft => "Borrador",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent | DeliveryStatus::Read => "✔",
            DeliveryStatus::Failed => "✖",
            _ => "•",
        }
    }
}

/// Human label for a raw status. Unknown values are shown as-is.
pub fn status_label(status: Option<&str>) -> String {
    match status {
        Some(raw) if !raw.is_empty() => DeliveryStatus::parse(raw)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| raw.to_string()),
        _ => "—".to_string(),
    }
}
