use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::user::User;

/// Events pushed to us by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    NewMessage { user: User, message: String },
    UserJoined { user: User },
    UserLeft { user: User },
    RosterSnapshot { users: Vec<User> },
    /// The server's confirmation of who we are.
    Welcome { user: User },
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::NewMessage { .. } => EventKind::NewMessage,
            ServerEvent::UserJoined { .. } => EventKind::UserJoined,
            ServerEvent::UserLeft { .. } => EventKind::UserLeft,
            ServerEvent::RosterSnapshot { .. } => EventKind::RosterSnapshot,
            ServerEvent::Welcome { .. } => EventKind::Welcome,
        }
    }
}

/// Events we send to the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    Join { username: String },
    SendMessage { message: String },
    Typing,
    StopTyping,
}

/// Handler registry key, one per inbound event name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewMessage,
    UserJoined,
    UserLeft,
    RosterSnapshot,
    Welcome,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::NewMessage,
        EventKind::UserJoined,
        EventKind::UserLeft,
        EventKind::RosterSnapshot,
        EventKind::Welcome,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::NewMessage => "new-message",
            EventKind::UserJoined => "user-joined",
            EventKind::UserLeft => "user-left",
            EventKind::RosterSnapshot => "roster-snapshot",
            EventKind::Welcome => "welcome",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outbound_events_use_event_and_data_envelope() {
        let join = serde_json::to_value(ClientEvent::Join {
            username: "alice".into(),
        })
        .unwrap();
        assert_eq!(join, json!({"event": "join", "data": {"username": "alice"}}));

        let send = serde_json::to_value(ClientEvent::SendMessage {
            message: "hi".into(),
        })
        .unwrap();
        assert_eq!(
            send,
            json!({"event": "send-message", "data": {"message": "hi"}})
        );
    }

    #[test]
    fn typing_events_carry_no_payload() {
        assert_eq!(
            serde_json::to_value(ClientEvent::Typing).unwrap(),
            json!({"event": "typing"})
        );
        assert_eq!(
            serde_json::to_value(ClientEvent::StopTyping).unwrap(),
            json!({"event": "stop-typing"})
        );
    }

    #[test]
    fn inbound_roster_snapshot_parses() {
        let raw = r#"{"event":"roster-snapshot","data":{"users":[
            {"id":1,"username":"alice","isTyping":false},
            {"id":2,"username":"bob","isTyping":true}
        ]}}"#;
        let event: ServerEvent = serde_json::from_str(raw).unwrap();

        assert_eq!(event.kind(), EventKind::RosterSnapshot);
        let ServerEvent::RosterSnapshot { users } = event else {
            panic!("wrong variant");
        };
        assert_eq!(users.len(), 2);
        assert!(users[1].is_typing);
    }

    #[test]
    fn kind_names_match_wire_names() {
        for kind in EventKind::ALL {
            let user = User::new("1", "alice", false);
            let event = match kind {
                EventKind::NewMessage => ServerEvent::NewMessage {
                    user,
                    message: "hello".into(),
                },
                EventKind::UserJoined => ServerEvent::UserJoined { user },
                EventKind::UserLeft => ServerEvent::UserLeft { user },
                EventKind::RosterSnapshot => ServerEvent::RosterSnapshot { users: vec![user] },
                EventKind::Welcome => ServerEvent::Welcome { user },
            };
            let wire = serde_json::to_value(&event).unwrap();
            assert_eq!(wire["event"], kind.name());
            assert_eq!(event.kind(), kind);
        }
    }

    #[test]
    fn unknown_event_names_are_rejected() {
        let raw = r#"{"event":"kick","data":{}}"#;
        assert!(serde_json::from_str::<ServerEvent>(raw).is_err());
    }
}
