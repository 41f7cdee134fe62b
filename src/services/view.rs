use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::domain::user::User;

use super::session::ChatSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterLine {
    pub username: String,
    pub is_me: bool,
    /// Never set for our own line.
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub username: String,
    pub text: String,
    pub is_mine: bool,
    pub received_at: DateTime<Utc>,
}

impl Display for TranscriptLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let me = if self.is_mine { " (me)" } else { "" };
        write!(
            f,
            "[ {}{} | {} ]: {}",
            self.username,
            me,
            self.received_at.format("%H-%M-%S"),
            self.text
        )
    }
}

/// Read-only snapshot handed to the UI after every step of the session loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    pub joined: bool,
    pub online: Vec<RosterLine>,
    pub transcript: Vec<TranscriptLine>,
    pub input: String,
}

impl SessionView {
    pub fn render(session: &ChatSession) -> Self {
        if !session.is_joined() {
            return SessionView::default();
        }
        let me = session.identity();

        SessionView {
            joined: true,
            online: session
                .roster()
                .users()
                .iter()
                .map(|user| {
                    let is_me = is_me(me, user);
                    RosterLine {
                        username: user.username.clone(),
                        is_me,
                        is_typing: !is_me && user.is_typing,
                    }
                })
                .collect(),
            transcript: session
                .transcript()
                .entries()
                .iter()
                .map(|entry| TranscriptLine {
                    username: entry.user().username.clone(),
                    text: entry.body().to_string(),
                    is_mine: entry.is_mine(me),
                    received_at: entry.received_at(),
                })
                .collect(),
            input: session.input().into(),
        }
    }

    /// Who is typing, other than us.
    pub fn typing_usernames(&self) -> Vec<&str> {
        self.online
            .iter()
            .filter(|line| line.is_typing)
            .map(|line| line.username.as_str())
            .collect()
    }
}

fn is_me(me: Option<&User>, user: &User) -> bool {
    me.map_or(false, |me| me.same_as(user))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;
    use futures_channel::mpsc::unbounded;

    use super::*;
    use crate::services::connection::ConnectionAdapter;

    fn joined_session(identity: Option<User>) -> ChatSession {
        let (outbound_tx, _outbound_rx) = unbounded();
        let (_inbound_tx, inbound_rx) = unbounded();
        let adapter: ConnectionAdapter<ChatSession> =
            ConnectionAdapter::from_channels(outbound_tx, inbound_rx);
        let mut session =
            ChatSession::new(identity, adapter.emitter(), Duration::from_millis(1000));
        session.join("alice");
        session
    }

    #[test]
    fn nothing_is_shown_before_joining() {
        let (outbound_tx, _outbound_rx) = unbounded();
        let (_inbound_tx, inbound_rx) = unbounded();
        let adapter: ConnectionAdapter<ChatSession> =
            ConnectionAdapter::from_channels(outbound_tx, inbound_rx);
        let session = ChatSession::new(None, adapter.emitter(), Duration::from_millis(1000));

        assert_eq!(SessionView::render(&session), SessionView::default());
    }

    #[test]
    fn own_line_is_marked_me_and_never_typing() {
        let mut session = joined_session(Some(User::new("1", "alice", false)));
        session.on_roster_snapshot(vec![
            User::new("1", "alice", true),
            User::new("2", "bob", true),
            User::new("3", "carol", false),
        ]);

        let view = SessionView::render(&session);
        assert_eq!(
            view.online,
            vec![
                RosterLine {
                    username: "alice".into(),
                    is_me: true,
                    is_typing: false
                },
                RosterLine {
                    username: "bob".into(),
                    is_me: false,
                    is_typing: true
                },
                RosterLine {
                    username: "carol".into(),
                    is_me: false,
                    is_typing: false
                },
            ]
        );
        assert_eq!(view.typing_usernames(), vec!["bob"]);
    }

    #[test]
    fn transcript_lines_resolve_mine_by_id() {
        let mut session = joined_session(Some(User::new("1", "alice", false)));
        session.on_new_message(User::new("1", "alice", false), "hi".into());
        session.on_user_joined(User::new("2", "alice", false));
        session.on_user_left(User::new("2", "alice", false));

        let view = SessionView::render(&session);
        let lines: Vec<(&str, &str, bool)> = view
            .transcript
            .iter()
            .map(|line| (line.username.as_str(), line.text.as_str(), line.is_mine))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("alice", "hi", true),
                ("alice", "joined", false),
                ("alice", "left", false),
            ]
        );

        let arrivals: Vec<_> = session
            .transcript()
            .entries()
            .iter()
            .map(|entry| entry.received_at())
            .collect();
        let shown: Vec<_> = view.transcript.iter().map(|line| line.received_at).collect();
        assert_eq!(shown, arrivals);
    }

    #[test]
    fn transcript_line_shows_arrival_time() {
        let received_at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 5, 7).unwrap();
        let line = TranscriptLine {
            username: "alice".into(),
            text: "hi".into(),
            is_mine: true,
            received_at,
        };
        assert_eq!(line.to_string(), "[ alice (me) | 09-05-07 ]: hi");

        let joined = TranscriptLine {
            username: "bob".into(),
            text: "joined".into(),
            is_mine: false,
            received_at,
        };
        assert_eq!(joined.to_string(), "[ bob | 09-05-07 ]: joined");
    }

    #[test]
    fn without_identity_nothing_is_mine() {
        let mut session = joined_session(None);
        session.on_roster_snapshot(vec![User::new("1", "alice", true)]);
        session.on_new_message(User::new("1", "alice", false), "hi".into());

        let view = SessionView::render(&session);
        assert!(!view.online[0].is_me);
        assert!(view.online[0].is_typing);
        assert!(!view.transcript[0].is_mine);
    }
}
