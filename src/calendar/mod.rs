pub mod event;
pub mod directory;
pub mod filter;
pub mod permissions;
pub mod sample_events;

pub use event::{EventAudience, EventItem, EventPayload, EventType, RawAudience, RawEvent, parse_timestamp, to_iso_string};
pub use directory::{DirectoryUser, Group, Recipient, RecipientBadge, School, Selection, Student};
pub use filter::{EventFilter, EventStats, TypeFilter, Window};
pub use permissions::{AuthUser, Role, can_create_events, can_delete_event};
