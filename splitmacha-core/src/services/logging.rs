//! Logging service - structured event logging to a JSON-lines file
//!
//! Provides a privacy-safe logging system that stores events in logs.jsonl
//! under the app directory. No user data (emails, names, amounts, request or
//! response bodies) and no credentials (passwords, tokens) are ever logged;
//! events carry routes, statuses and error categories only.
//!
//! This service is designed to be used by both CLI and mobile shells.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::id::generate_id;

/// File name of the event log
pub const LOG_FILE: &str = "logs.jsonl";

/// Get current unix timestamp in milliseconds
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "android") {
        "android"
    } else if cfg!(target_os = "ios") {
        "ios"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Mobile,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Mobile => "mobile",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            method: None,
            route: None,
            status: None,
            error_category: None,
        }
    }

    /// Set the request method and route context
    pub fn with_route(mut self, method: impl Into<String>, route: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.route = Some(route.into());
        self
    }

    /// Set the response status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the classified error category
    pub fn with_error(mut self, category: impl Into<String>) -> Self {
        self.error_category = Some(category.into());
        self
    }
}

/// A recorded log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub ts_ms: i64,
    pub entry_point: String,
    pub platform: String,
    pub app_version: String,
    #[serde(flatten)]
    pub event: LogEvent,
}

/// Structured event logger
pub struct LoggingService {
    path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    file: Mutex<File>,
}

impl LoggingService {
    /// Open (or create) the event log in the app directory
    pub fn new(app_dir: &Path, entry_point: EntryPoint, app_version: &str) -> Result<Self> {
        let path = app_dir.join(LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;

        Ok(Self {
            path,
            entry_point,
            app_version: app_version.to_string(),
            file: Mutex::new(file),
        })
    }

    /// Record an event
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            ts_ms: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            platform: detect_platform().to_string(),
            app_version: self.app_version.clone(),
            event,
        };

        let line = serde_json::to_string(&entry)?;
        let mut file = self.file.lock().expect("log file lock");
        writeln!(file, "{}", line).context("Failed to append log entry")?;
        Ok(())
    }

    /// Read the most recent `limit` entries, oldest first
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to open log file"),
        };

        let mut entries: Vec<LogEntry> = BufReader::new(file)
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if entries.len() > limit {
            entries.drain(..entries.len() - limit);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_and_read_back() {
        let dir = TempDir::new().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();

        service
            .log(
                LogEvent::new("api_request")
                    .with_route("POST", "/api/v1/auth/login")
                    .with_status(200),
            )
            .unwrap();
        service
            .log(
                LogEvent::new("api_error")
                    .with_route("GET", "/api/v1/users/me")
                    .with_status(401)
                    .with_error("unauthorized"),
            )
            .unwrap();

        let entries = service.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.event, "api_request");
        assert_eq!(entries[1].event.status, Some(401));
        assert_eq!(entries[1].event.error_category.as_deref(), Some("unauthorized"));
    }

    #[test]
    fn test_recent_limits_to_newest_entries() {
        let dir = TempDir::new().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();

        for i in 0..10 {
            service.log(LogEvent::new(format!("event_{}", i))).unwrap();
        }

        let entries = service.recent(3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].event.event, "event_9");
    }

    #[test]
    fn test_recent_with_no_log_file() {
        let dir = TempDir::new().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();
        std::fs::remove_file(dir.path().join(LOG_FILE)).unwrap();
        assert!(service.recent(5).unwrap().is_empty());
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let dir = TempDir::new().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Mobile, "0.1.0").unwrap();
        for _ in 0..5 {
            service.log(LogEvent::new("tick")).unwrap();
        }
        let entries = service.recent(5).unwrap();
        let mut ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
