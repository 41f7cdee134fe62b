use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{
    chat_log::{EntryBody, Transcript, TranscriptEntry},
    events::{ClientEvent, EventKind, ServerEvent},
    roster::OnlineRoster,
    user::User,
};

use super::{
    connection::{ConnectionAdapter, Emitter},
    typing::TypingDebouncer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unjoined,
    Joined,
}

/// Things the local user does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiInput {
    SubmitUsername(String),
    /// A keystroke that left the input buffer holding this text.
    Edit(String),
    Submit,
    Quit,
}

/// Presence and transcript state for one session.
///
/// Inbound events are folded in through the `on_*` methods (wired to the
/// connection by [`ChatSession::register_handlers`]); local input produces
/// outbound events on the [`Emitter`]. Everything is a no-op until joined.
pub struct ChatSession {
    state: SessionState,
    identity: Option<User>,
    roster: OnlineRoster,
    transcript: Transcript,
    input: String,
    typing: TypingDebouncer,
    /// Set once `typing` went out; cleared by the next roster snapshot or
    /// by `stop-typing`.
    typing_announced: bool,
    emitter: Emitter,
}

impl ChatSession {
    pub fn new(identity: Option<User>, emitter: Emitter, quiet_period: Duration) -> Self {
        Self {
            state: SessionState::Unjoined,
            identity,
            roster: OnlineRoster::new(),
            transcript: Transcript::new(),
            input: String::new(),
            typing: TypingDebouncer::new(quiet_period),
            typing_announced: false,
            emitter,
        }
    }

    /// Wires one handler per inbound event kind.
    pub fn register_handlers(adapter: &mut ConnectionAdapter<ChatSession>) {
        adapter.on(EventKind::NewMessage, |session, event| {
            if let ServerEvent::NewMessage { user, message } = event {
                session.on_new_message(user, message);
            }
        });
        adapter.on(EventKind::UserJoined, |session, event| {
            if let ServerEvent::UserJoined { user } = event {
                session.on_user_joined(user);
            }
        });
        adapter.on(EventKind::UserLeft, |session, event| {
            if let ServerEvent::UserLeft { user } = event {
                session.on_user_left(user);
            }
        });
        adapter.on(EventKind::RosterSnapshot, |session, event| {
            if let ServerEvent::RosterSnapshot { users } = event {
                session.on_roster_snapshot(users);
            }
        });
        adapter.on(EventKind::Welcome, |session, event| {
            if let ServerEvent::Welcome { user } = event {
                session.on_welcome(user);
            }
        });
    }

    pub fn is_joined(&self) -> bool {
        self.state == SessionState::Joined
    }

    pub fn identity(&self) -> Option<&User> {
        self.identity.as_ref()
    }

    pub fn roster(&self) -> &OnlineRoster {
        &self.roster
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing.deadline()
    }

    /// Whether the server already shows us as typing. Unknown identity, or an
    /// identity missing from the roster, reads as not typing.
    pub fn self_marked_typing(&self) -> bool {
        self.identity
            .as_ref()
            .map_or(false, |me| self.roster.is_typing(&me.id))
    }

    pub fn handle_input(&mut self, input: UiInput, now: Instant) {
        match input {
            UiInput::SubmitUsername(username) => {
                self.join(&username);
            }
            UiInput::Edit(text) => self.keystroke(text, now),
            UiInput::Submit => {
                self.send_message();
            }
            UiInput::Quit => {}
        }
    }

    /// The one-way Unjoined -> Joined transition. Optimistic: the server's
    /// answer is not awaited.
    pub fn join(&mut self, username: &str) -> bool {
        if self.is_joined() {
            log::warn!("Already joined, ignoring join as {username:?}");
            return false;
        }
        let username = username.trim();
        if username.is_empty() {
            log::warn!("Refusing to join with an empty username");
            return false;
        }

        self.emitter.emit(ClientEvent::Join {
            username: username.into(),
        });
        self.state = SessionState::Joined;
        log::info!("Joined as {username}");
        true
    }

    /// A keystroke that did not send. Announces typing unless the roster
    /// already shows us typing or we announced since the last snapshot, then
    /// pushes the stop-typing deadline out by the quiet period.
    pub fn keystroke(&mut self, text: String, now: Instant) {
        if !self.is_joined() {
            return;
        }
        self.input = text;

        self.typing.cancel();
        if !self.typing_announced && !self.self_marked_typing() {
            self.emitter.emit(ClientEvent::Typing);
            self.typing_announced = true;
        }
        self.typing.reschedule(now);
    }

    fn stop_typing(&mut self) {
        self.typing.cancel();
        self.typing_announced = false;
        self.emitter.emit(ClientEvent::StopTyping);
    }

    /// Sends the buffer, clears it and collapses typing to stopped right away.
    /// A blank buffer is not sent but still stops typing.
    pub fn send_message(&mut self) -> bool {
        if !self.is_joined() {
            return false;
        }
        let sent = if self.input.trim().is_empty() {
            log::debug!("Nothing to send");
            false
        } else {
            let message = std::mem::take(&mut self.input);
            self.emitter.emit(ClientEvent::SendMessage { message });
            true
        };
        self.stop_typing();
        sent
    }

    /// Fires the stop-typing timer if it is due. Returns whether it fired.
    pub fn fire_typing_timer(&mut self, now: Instant) -> bool {
        if !self.typing.take_expired(now) {
            return false;
        }
        self.stop_typing();
        true
    }

    pub fn on_new_message(&mut self, user: User, message: String) {
        self.append(user, EntryBody::Text(message));
    }

    pub fn on_user_joined(&mut self, user: User) {
        self.append(user, EntryBody::Joined);
    }

    pub fn on_user_left(&mut self, user: User) {
        self.append(user, EntryBody::Left);
    }

    pub fn on_roster_snapshot(&mut self, users: Vec<User>) {
        if !self.is_joined() {
            return;
        }
        self.roster.replace(users);
        self.typing_announced = false;
    }

    /// The server telling us who we are. Replaces whatever identity we had.
    pub fn on_welcome(&mut self, user: User) {
        if !self.is_joined() {
            return;
        }
        log::info!("Server confirmed identity {} ({})", user.username, user.id);
        self.identity = Some(user);
    }

    fn append(&mut self, user: User, body: EntryBody) {
        if !self.is_joined() {
            log::debug!("Not joined, dropping {body} from {}", user.username);
            return;
        }
        self.transcript.push(TranscriptEntry::new(user, body));
    }
}
