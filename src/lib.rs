pub mod calendar;
pub mod input;
pub mod ui;
pub mod sync;
pub mod storage;
pub mod app;
pub mod messages;
pub mod reports;
pub mod store;

pub use calendar::{EventItem, EventType};
pub use app::{AppState, EventForm, Mode};
pub use store::AppContext;

pub use input::{normal_mode, search_mode};
