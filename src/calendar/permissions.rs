use serde::{Deserialize, Serialize};

use crate::calendar::EventItem;

pub const GLOBAL_SCHOOL_ID: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    Admin,
    Teacher,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "SUPERADMIN" => Role::SuperAdmin,
            "ADMIN" => Role::Admin,
            "TEACHER" => Role::Teacher,
            other => Role::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p == "*" || p == permission)
    }

    pub fn is_global_admin(&self) -> bool {
        self.school_id
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(GLOBAL_SCHOOL_ID))
    }
}

/// Whether the delete action is offered for `event`.
///
/// This only decides what the console shows. The API re-checks every delete
/// and is the only authority on whether it happens.
pub fn can_delete_event(user: Option<&AuthUser>, event: &EventItem) -> bool {
    let Some(user) = user else {
        return false;
    };

    let is_creator = same_identity(Some(&user.email), event.created_by_email.as_deref());
    let same_school = same_identity(user.school_id.as_deref(), event.school_id.as_deref());

    match user.role() {
        Role::SuperAdmin => is_creator,
        Role::Admin => same_school,
        Role::Teacher => is_creator && same_school,
        Role::Other(_) => false,
    }
}

pub fn can_create_events(user: Option<&AuthUser>) -> bool {
    let Some(user) = user else {
        return false;
    };
    matches!(user.role(), Role::SuperAdmin | Role::Admin | Role::Teacher)
        || user.has_permission("events.create")
}

fn same_identity(left: Option<&str>, right: Option<&str>) -> bool {
    match (left.map(str::trim), right.map(str::trim)) {
        (Some(l), Some(r)) if !l.is_empty() && !r.is_empty() => l.to_lowercase() == r.to_lowercase(),
        _ => false,
    }
}
