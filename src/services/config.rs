use std::{path::PathBuf, time::Duration};

use super::typing::DEFAULT_QUIET_PERIOD;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8080";
pub const DEFAULT_SESSION_DIR: &str = ".marain-session";

pub fn getenv(name: &str) -> String {
    match std::env::var(name) {
        Ok(var) => var,
        _ => "".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    pub session_dir: PathBuf,
    pub typing_quiet_period: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            session_dir: DEFAULT_SESSION_DIR.into(),
            typing_quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(getenv)
    }

    /// Builds the config from any `name -> value` lookup; empty means unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> String) -> Self {
        let mut config = ClientConfig::default();

        let url = lookup("MARAIN_SERVER_URL");
        if url.is_empty() {
            log::warn!(
                "Could not find MARAIN_SERVER_URL environment variable. Falling back to {DEFAULT_SERVER_URL}."
            );
        } else {
            config.server_url = url;
        }

        let dir = lookup("MARAIN_SESSION_DIR");
        if !dir.is_empty() {
            config.session_dir = dir.into();
        }

        let quiet = lookup("MARAIN_TYPING_QUIET_MS");
        if !quiet.is_empty() {
            match quiet.parse::<u64>() {
                Ok(ms) => config.typing_quiet_period = Duration::from_millis(ms),
                Err(e) => log::warn!(
                    "MARAIN_TYPING_QUIET_MS={quiet:?} is not a number of milliseconds ({e}). Falling back to {}ms.",
                    DEFAULT_QUIET_PERIOD.as_millis()
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> String {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned().unwrap_or_default()
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        assert_eq!(ClientConfig::from_lookup(lookup(&[])), ClientConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("MARAIN_SERVER_URL", "ws://chat.example:9000"),
            ("MARAIN_SESSION_DIR", "/tmp/tab-1"),
            ("MARAIN_TYPING_QUIET_MS", "250"),
        ]));

        assert_eq!(config.server_url, "ws://chat.example:9000");
        assert_eq!(config.session_dir, PathBuf::from("/tmp/tab-1"));
        assert_eq!(config.typing_quiet_period, Duration::from_millis(250));
    }

    #[test]
    fn unparsable_quiet_period_keeps_the_default() {
        let config = ClientConfig::from_lookup(lookup(&[("MARAIN_TYPING_QUIET_MS", "soon")]));
        assert_eq!(config.typing_quiet_period, DEFAULT_QUIET_PERIOD);
    }
}
