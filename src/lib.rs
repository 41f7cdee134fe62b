//! Real-time chat client core: a single websocket connection, a presence and
//! transcript state machine fed by server events, and typing debounce on the
//! way out.

pub mod domain;
pub mod handlers;
pub mod services;

pub mod prelude {
    pub use crate::domain::{
        chat_log::{EntryBody, Transcript, TranscriptEntry},
        events::{ClientEvent, EventKind, ServerEvent},
        roster::OnlineRoster,
        user::{User, UserId},
    };
    pub use crate::services::{
        config::ClientConfig,
        connection::{ConnectionAdapter, Emitter},
        identity::{FileStore, MemoryStore, SessionStore},
        session::{ChatSession, SessionState, UiInput},
        user_session::SessionWorker,
        view::SessionView,
    };
}
