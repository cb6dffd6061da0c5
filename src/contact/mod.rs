//! Contact message store
//!
//! The contact form's only contract with the rest of the system: validate a
//! `{email, name, message}` submission and append it to an NDJSON store,
//! returning the stored record's identifier. Every failure is surfaced as a
//! typed error; submissions are never silently dropped.

use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap();
}

/// Why a submission was rejected or lost
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("message store unavailable: {path}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An incoming contact form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub email: String,
    pub name: String,
    pub message: String,
}

impl ContactMessage {
    /// Validate the submission: a well-formed email address and non-blank
    /// name and message.
    pub fn validate(&self) -> Result<(), ContactError> {
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(ContactError::InvalidInput("email"));
        }
        if self.name.trim().is_empty() {
            return Err(ContactError::InvalidInput("name"));
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::InvalidInput("message"));
        }
        Ok(())
    }
}

/// A stored message record, one JSON object per line
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub email: String,
    pub name: String,
    pub message: String,
    pub received_at: DateTime<Local>,
}

/// Append-only message store backed by an NDJSON file
pub struct MessageStore {
    path: PathBuf,
}

impl MessageStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Validate and persist a submission, returning the record identifier
    pub fn append(&self, msg: &ContactMessage) -> Result<String, ContactError> {
        msg.validate()?;

        let received_at = Local::now();
        let record = StoredMessage {
            id: format!("msg-{}", received_at.format("%Y%m%d%H%M%S%3f")),
            email: msg.email.trim().to_string(),
            name: msg.name.trim().to_string(),
            message: msg.message.trim().to_string(),
            received_at,
        };

        let line = serde_json::to_string(&record)
            .map_err(|e| ContactError::StorageUnavailable {
                path: self.path.clone(),
                source: e.into(),
            })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ContactError::StorageUnavailable {
                path: self.path.clone(),
                source: e,
            })?;

        writeln!(file, "{}", line).map_err(|e| ContactError::StorageUnavailable {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::info!("stored contact message {} from {}", record.id, record.email);
        Ok(record.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn msg(email: &str, name: &str, message: &str) -> ContactMessage {
        ContactMessage {
            email: email.to_string(),
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_append_returns_identifier() {
        let tmp = TempDir::new().unwrap();
        let store = MessageStore::new(tmp.path().join("messages.ndjson"));
        let id = store
            .append(&msg("max@example.com", "Max", "Hello there"))
            .unwrap();
        assert!(id.starts_with("msg-"));

        let raw = std::fs::read_to_string(tmp.path().join("messages.ndjson")).unwrap();
        let stored: StoredMessage = serde_json::from_str(raw.lines().next().unwrap()).unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.name, "Max");
    }

    #[test]
    fn test_records_accumulate() {
        let tmp = TempDir::new().unwrap();
        let store = MessageStore::new(tmp.path().join("messages.ndjson"));
        store.append(&msg("a@example.com", "A", "one")).unwrap();
        store.append(&msg("b@example.com", "B", "two")).unwrap();
        let raw = std::fs::read_to_string(tmp.path().join("messages.ndjson")).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn test_rejects_bad_email() {
        let tmp = TempDir::new().unwrap();
        let store = MessageStore::new(tmp.path().join("messages.ndjson"));
        for bad in ["not-an-email", "missing@tld", "@example.com", ""] {
            assert!(matches!(
                store.append(&msg(bad, "Max", "Hi")).unwrap_err(),
                ContactError::InvalidInput("email")
            ));
        }
        assert!(!tmp.path().join("messages.ndjson").exists());
    }

    #[test]
    fn test_rejects_blank_name_and_message() {
        assert!(matches!(
            msg("max@example.com", "   ", "Hi").validate().unwrap_err(),
            ContactError::InvalidInput("name")
        ));
        assert!(matches!(
            msg("max@example.com", "Max", "\n").validate().unwrap_err(),
            ContactError::InvalidInput("message")
        ));
    }

    #[test]
    fn test_unwritable_store_is_storage_unavailable() {
        let store = MessageStore::new("/no/such/dir/messages.ndjson");
        assert!(matches!(
            store
                .append(&msg("max@example.com", "Max", "Hi"))
                .unwrap_err(),
            ContactError::StorageUnavailable { .. }
        ));
    }
}
