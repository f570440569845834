mod authentication;
mod session;
mod presentation;
mod calendar_views;
mod dialogs;

pub use authentication::{login, logout};
pub use session::run_tui;
