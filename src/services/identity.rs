use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use anyhow::{anyhow, Result};

use crate::domain::user::User;

/// Well-known key the session identity lives under.
pub const SESSION_IDENTITY_KEY: &str = "user";

/// Per-tab key-value storage. Values are opaque strings.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.into(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// One file per key inside a session directory, so values outlive the process.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Could not read session key {key}. Error: {e}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            anyhow!(
                "Could not create session directory {}. Error: {e}",
                self.dir.display()
            )
        })?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Missing and malformed records both mean "no identity yet".
pub fn load_identity(store: &dyn SessionStore) -> Option<User> {
    let raw = store.get(SESSION_IDENTITY_KEY)?;
    match serde_json::from_str::<User>(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            log::warn!("Ignoring malformed session identity record. Error: {e}");
            None
        }
    }
}

pub fn save_identity(store: &mut dyn SessionStore, user: &User) -> Result<()> {
    let serialized = serde_json::to_string(user)?;
    store.set(SESSION_IDENTITY_KEY, serialized)
}
