use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, stable user identifier assigned by the server.
///
/// Servers in the wild send either strings or bare numbers, both are held as
/// the same opaque string so comparisons stay by-value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => UserId(text),
            RawId::Number(number) => UserId(number.to_string()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub is_typing: bool,
}

impl User {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>, is_typing: bool) -> Self {
        User {
            id: id.into(),
            username: username.into(),
            is_typing,
        }
    }

    /// Identity is by id only, never by the rest of the record.
    pub fn same_as(&self, other: &User) -> bool {
        self.id == other.id
    }
}
