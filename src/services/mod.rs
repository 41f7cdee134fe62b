pub mod config;
pub mod connection;
pub mod identity;
pub mod session;
pub mod typing;
pub mod user_session;
pub mod view;
