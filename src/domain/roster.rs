use super::user::{User, UserId};

/// Who is online right now, exactly as the last roster snapshot said.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineRoster {
    users: Vec<User>,
}

impl OnlineRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole roster; nothing from the previous snapshot survives.
    pub fn replace(&mut self, users: Vec<User>) {
        self.users = users;
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == *id)
    }

    /// Absent users are not typing.
    pub fn is_typing(&self, id: &UserId) -> bool {
        self.get(id).map_or(false, |user| user.is_typing)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
