use chrono::{Datelike, NaiveDate};

use crate::calendar::AuthUser;
use crate::messages::Message;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    user: Option<AuthUser>,
}

impl AuthState {
    pub fn set_user(&mut self, user: Option<AuthUser>) {
        self.user = user;
    }

    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.has_permission(permission))
    }
}

/// School year picked in the header. Unset means the current calendar year.
#[derive(Debug, Clone, Default)]
pub struct YearState {
    selected: Option<i32>,
}

impl YearState {
    pub fn select(&mut self, year: Option<i32>) {
        self.selected = year;
    }

    pub fn effective_year(&self, today: NaiveDate) -> i32 {
        self.selected.unwrap_or_else(|| today.year())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageState {
    pub messages: Vec<Message>,
    pub drafts: Vec<Message>,
}

impl MessageState {
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.insert(0, message);
    }

    pub fn add_draft(&mut self, draft: Message) {
        self.drafts.insert(0, draft);
    }

    pub fn remove_draft(&mut self, id: &str) {
        self.drafts.retain(|d| d.id != id);
    }
}

/// State shared by every screen, created once at startup and passed down.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub auth: AuthState,
    pub year: YearState,
    pub messages: MessageState,
}

impl AppContext {
    pub fn new(user: Option<AuthUser>) -> Self {
        let mut ctx = Self::default();
        ctx.auth.set_user(user);
        ctx
    }
}
