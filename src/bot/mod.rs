/// Handlers for each bot request
pub mod handlers;
/// Classification of chat text into requests
pub mod request;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// Telegram runtime entrypoint
pub mod runner;

pub use request::{Command, PaperRequest};
pub use runner::run_bot;
