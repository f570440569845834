use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name_father: String,
    #[serde(default)]
    pub last_name_mother: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

impl Student {
    pub fn display_name(&self) -> String {
        [&self.first_name, &self.last_name_father, &self.last_name_mother]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub school_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientBadge {
    Usuario,
    Alumno,
}

impl RecipientBadge {
    pub fn label(&self) -> &'static str {
        match self {
            RecipientBadge::Usuario => "Usuario",
            RecipientBadge::Alumno => "Alumno",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub selection_id: String,
    pub name: String,
    pub email: Option<String>,
    pub badge: RecipientBadge,
}

impl Recipient {
    fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self.email.as_deref().is_some_and(|e| e.to_lowercase().contains(term))
            || self.badge.label().to_lowercase().contains(term)
    }
}

/// Directory users followed by students. The two sources are not
/// deduplicated against each other.
pub fn merge_recipients(users: &[DirectoryUser], students: &[Student]) -> Vec<Recipient> {
    let from_users = users.iter().filter_map(|user| {
        let email = clean(user.email.as_deref());
        let selection_id = selection_id(email, &user.id)?;
        let name = if user.name.trim().is_empty() {
            email.unwrap_or(&selection_id).to_string()
        } else {
            user.name.trim().to_string()
        };
        Some(Recipient {
            selection_id,
            name,
            email: email.map(str::to_string),
            badge: RecipientBadge::Usuario,
        })
    });

    let from_students = students.iter().filter_map(|student| {
        let email = clean(student.email.as_deref());
        Some(Recipient {
            selection_id: selection_id(email, &student.id)?,
            name: student.display_name(),
            email: email.map(str::to_string),
            badge: RecipientBadge::Alumno,
        })
    });

    from_users.chain(from_students).collect()
}

pub fn filter_recipients<'a>(recipients: &'a [Recipient], query: &str) -> Vec<&'a Recipient> {
    let term = query.trim().to_lowercase();
    recipients
        .iter()
        .filter(|r| term.is_empty() || r.matches(&term))
        .collect()
}

fn selection_id(email: Option<&str>, id: &str) -> Option<String> {
    email.or_else(|| clean(Some(id))).map(str::to_string)
}

fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Multi-select list; selecting an id twice removes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn from_ids(ids: Vec<String>) -> Self {
        let mut selection = Self::default();
        for id in ids {
            if !selection.contains(&id) {
                selection.ids.push(id);
            }
        }
        selection
    }

    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.ids.iter().position(|v| v == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.to_string());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|v| v == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn into_ids(self) -> Vec<String> {
        self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn student(id: &str, first: &str, father: &str, mother: &str, email: Option<&str>) -> Student {
        Student {
            id: id.to_string(),
            first_name: first.to_string(),
            last_name_father: father.to_string(),
            last_name_mother: mother.to_string(),
            email: email.map(String::from),
            ..Student::default()
        }
    }

    fn user(id: &str, name: &str, email: Option<&str>) -> DirectoryUser {
        DirectoryUser {
            id: id.to_string(),
            name: name.to_string(),
            email: email.map(String::from),
            ..DirectoryUser::default()
        }
    }

    #[test]
    fn student_display_name_joins_name_parts() {
        assert_eq!(student("s1", "Ana", "Pérez", "Soto", None).display_name(), "Ana Pérez Soto");
        assert_eq!(student("s1", " Ana ", "", "Soto", None).display_name(), "Ana Soto");
    }

    #[test]
    fn same_email_from_both_sources_yields_two_entries() {
        let users = vec![user("u1", "Ana Directora", Some("a@x.com"))];
        let students = vec![student("s1", "Ana", "Pérez", "", Some("a@x.com"))];

        let merged = merge_recipients(&users, &students);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].selection_id, "a@x.com");
        assert_eq!(merged[0].badge, RecipientBadge::Usuario);
        assert_eq!(merged[1].selection_id, "a@x.com");
        assert_eq!(merged[1].badge, RecipientBadge::Alumno);
    }

    #[test]
    fn selection_id_falls_back_to_raw_id() {
        let merged = merge_recipients(&[], &[student("s1", "Luis", "Rojas", "", None)]);

        assert_eq!(merged[0].selection_id, "s1");
    }

    #[test]
    fn entries_without_identifier_are_excluded() {
        let users = vec![user("", "Sin id", Some("  "))];
        let students = vec![student(" ", "Nadie", "", "", None)];

        assert!(merge_recipients(&users, &students).is_empty());
    }

    #[test]
    fn user_without_name_shows_email() {
        let merged = merge_recipients(&[user("u1", "", Some("prof@x.com"))], &[]);

        assert_eq!(merged[0].name, "prof@x.com");
    }

    #[test]
    fn filter_matches_name_email_and_badge_case_insensitively() {
        let users = vec![user("u1", "Marta Díaz", Some("marta@x.com"))];
        let students = vec![student("s1", "Pedro", "Lagos", "", Some("pedro@x.com"))];
        let merged = merge_recipients(&users, &students);

        assert_eq!(filter_recipients(&merged, "MARTA").len(), 1);
        assert_eq!(filter_recipients(&merged, "pedro@").len(), 1);
        assert_eq!(filter_recipients(&merged, "alumno")[0].name, "Pedro Lagos");
        assert_eq!(filter_recipients(&merged, "").len(), 2);
        assert!(filter_recipients(&merged, "zzz").is_empty());
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut selection = Selection::default();

        selection.toggle("a@x.com");
        selection.toggle("b@x.com");
        assert_eq!(selection.ids(), &["a@x.com".to_string(), "b@x.com".to_string()]);

        selection.toggle("a@x.com");
        assert_eq!(selection.ids(), &["b@x.com".to_string()]);
        assert!(!selection.contains("a@x.com"));
    }

    #[test]
    fn selection_from_ids_drops_duplicates() {
        let selection = Selection::from_ids(vec!["g1".into(), "g1".into(), "g2".into()]);

        assert_eq!(selection.len(), 2);
    }
}
