// API key lookup for the rating pass
//
// Checked in order:
// 1. Explicit key (--api-key)
// 2. Environment variable STORELINK_OPENAI_KEY
// 3. Key file (api_key.txt by default)

use std::env;
use std::path::Path;

use crate::error::ScoreError;

/// Environment variable holding the API key
pub const KEY_ENV_VAR: &str = "STORELINK_OPENAI_KEY";

/// Key file consulted last
pub const DEFAULT_KEY_FILE: &str = "api_key.txt";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key passed on the command line
    Flag,
    /// Key retrieved from environment variable
    Environment,
    /// Key read from the key file
    File,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Flag => "flag",
            KeySource::Environment => "environment",
            KeySource::File => "key file",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

impl KeyLookup {
    /// The key, or `MissingKey` when every source came up empty.
    pub fn require(self) -> Result<String, ScoreError> {
        self.key.ok_or(ScoreError::MissingKey)
    }
}

/// Get the API key from the flag, the environment, then the key file.
pub fn get_api_key(flag: Option<&str>, key_file: &Path) -> KeyLookup {
    lookup(flag, env::var(KEY_ENV_VAR).ok(), key_file)
}

fn lookup(flag: Option<&str>, env_value: Option<String>, key_file: &Path) -> KeyLookup {
    if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
        return KeyLookup {
            key: Some(key.to_string()),
            source: KeySource::Flag,
        };
    }

    if let Some(key) = env_value {
        let key = key.trim();
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key.to_string()),
                source: KeySource::Environment,
            };
        }
    }

    // Missing or unreadable key file falls through to None
    if let Ok(contents) = std::fs::read_to_string(key_file) {
        let key = contents.trim();
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key.to_string()),
                source: KeySource::File,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flag_wins() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("api_key.txt");
        std::fs::write(&file, "sk-file").unwrap();

        let found = lookup(Some("sk-flag"), Some("sk-env".into()), &file);
        assert_eq!(found.key.as_deref(), Some("sk-flag"));
        assert_eq!(found.source, KeySource::Flag);
    }

    #[test]
    fn test_env_before_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("api_key.txt");
        std::fs::write(&file, "sk-file").unwrap();

        let found = lookup(None, Some("sk-env".into()), &file);
        assert_eq!(found.key.as_deref(), Some("sk-env"));
        assert_eq!(found.source, KeySource::Environment);
    }

    #[test]
    fn test_file_is_trimmed() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("api_key.txt");
        std::fs::write(&file, "  sk-file\n").unwrap();

        let found = lookup(Some("  "), Some(String::new()), &file);
        assert_eq!(found.key.as_deref(), Some("sk-file"));
        assert_eq!(found.source, KeySource::File);
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempdir().unwrap();
        let found = lookup(None, None, &dir.path().join("missing.txt"));
        assert_eq!(found.source, KeySource::None);
        assert!(matches!(found.require(), Err(ScoreError::MissingKey)));
    }

    #[test]
    fn test_empty_key_file_is_not_a_key() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("api_key.txt");
        std::fs::write(&file, "\n").unwrap();
        assert!(lookup(None, None, &file).key.is_none());
    }
}
