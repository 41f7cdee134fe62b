pub mod chat_log;
pub mod events;
pub mod roster;
pub mod types;
pub mod user;
