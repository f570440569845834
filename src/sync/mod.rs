pub mod api_client;
pub mod loader;
pub mod outbox;
pub mod session;
