use std::collections::{BTreeMap, HashMap};

use crate::calendar::{DirectoryUser, School};
use crate::messages::Message;

pub const UNKNOWN_SCHOOL: &str = "desconocido";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolSummary {
    pub id: String,
    pub name: String,
    pub users: usize,
    pub admins: usize,
    pub messages: usize,
    pub app_active: u64,
}

/// Per-school counters for the dashboard. Known schools come first in the
/// order given; ids seen only in the data follow in first-seen order and are
/// named `Colegio <id>`.
pub fn school_breakdown(
    schools: &[School],
    users: &[DirectoryUser],
    messages: &[Message],
    app_active: &BTreeMap<String, u64>,
) -> Vec<SchoolSummary> {
    let mut order: Vec<(String, String)> = schools
        .iter()
        .map(|s| (s.id.clone(), s.name.clone()))
        .collect();
    let mut remember = |id: &str| {
        if !order.iter().any(|(known, _)| known == id) {
            order.push((id.to_string(), format!("Colegio {}", id)));
        }
    };

    let mut user_count: HashMap<String, usize> = HashMap::new();
    let mut admin_count: HashMap<String, usize> = HashMap::new();
    for user in users {
        let id = school_key(user.school_id.as_deref());
        *user_count.entry(id.clone()).or_default() += 1;
        if user.role.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("admin")) {
            *admin_count.entry(id.clone()).or_default() += 1;
        }
        remember(&id);
    }

    let mut message_count: HashMap<String, usize> = HashMap::new();
    for message in messages {
        let id = school_key(message.school_id.as_deref());
        *message_count.entry(id.clone()).or_default() += 1;
        remember(&id);
    }

    for id in app_active.keys() {
        remember(id);
    }

    order
        .into_iter()
        .map(|(id, name)| SchoolSummary {
            users: user_count.get(&id).copied().unwrap_or(0),
            admins: admin_count.get(&id).copied().unwrap_or(0),
            messages: message_count.get(&id).copied().unwrap_or(0),
            app_active: app_active.get(&id).copied().unwrap_or(0),
            id,
            name,
        })
        .collect()
}

fn school_key(school_id: Option<&str>) -> String {
    match school_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => UNKNOWN_SCHOOL.to_string(),
    }
}
