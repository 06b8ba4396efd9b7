//! Newline-delimited append log.
//!
//! Every record is one JSON line wrapped in a self-describing envelope
//! (`kind`, `schema_version`, `recorded_at`, `body`). Lines are only ever
//! appended. Readers skip lines they cannot parse and ignore fields they do
//! not know. A log without a path keeps its lines in memory.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::Result;

/// Envelope schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct EnvelopeOut<'a, T: Serialize> {
    kind: &'a str,
    schema_version: u32,
    recorded_at: DateTime<Utc>,
    body: &'a T,
}

#[derive(Debug, Deserialize)]
struct EnvelopeIn {
    kind: String,
    #[serde(default)]
    schema_version: u32,
    body: serde_json::Value,
}

#[derive(Debug)]
enum Backing {
    Memory(Vec<String>),
    File(PathBuf),
}

/// An append-only log with a single writer lock.
#[derive(Debug)]
pub struct AppendLog {
    backing: Mutex<Backing>,
}

impl AppendLog {
    /// A log that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            backing: Mutex::new(Backing::Memory(Vec::new())),
        }
    }

    /// A log backed by a file, created on first append.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            backing: Mutex::new(Backing::File(path.into())),
        }
    }

    /// From an optional path; `None` stays in memory.
    pub fn from_option(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::at_path(path),
            None => Self::in_memory(),
        }
    }

    /// File path, when backed by one.
    pub fn path(&self) -> Option<PathBuf> {
        match &*self.backing.lock().unwrap_or_else(PoisonError::into_inner) {
            Backing::File(path) => Some(path.clone()),
            Backing::Memory(_) => None,
        }
    }

    /// Append one record.
    pub fn append<T: Serialize>(&self, kind: &str, body: &T) -> Result<()> {
        let mut line = serde_json::to_string(&EnvelopeOut {
            kind,
            schema_version: SCHEMA_VERSION,
            recorded_at: Utc::now(),
            body,
        })?;
        line.push('\n');

        let mut backing = self.backing.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *backing {
            Backing::Memory(lines) => lines.push(line),
            Backing::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let mut file = OpenOptions::new().create(true).append(true).open(&*path)?;
                file.write_all(line.as_bytes())?;
                file.flush()?;
            }
        }
        Ok(())
    }

    /// Read every record of one kind, in write order.
    pub fn read<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>> {
        let raw = self.raw_lines()?;
        let mut records = Vec::new();

        for (index, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let envelope: EnvelopeIn = match serde_json::from_str(line) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping malformed log line");
                    continue;
                }
            };
            if envelope.kind != kind {
                continue;
            }
            if envelope.schema_version > SCHEMA_VERSION {
                warn!(
                    line = index + 1,
                    schema_version = envelope.schema_version,
                    "Reading record from a newer schema"
                );
            }
            match serde_json::from_value(envelope.body) {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = index + 1, kind, error = %e, "Skipping unreadable record"),
            }
        }
        Ok(records)
    }

    fn raw_lines(&self) -> Result<String> {
        let backing = self.backing.lock().unwrap_or_else(PoisonError::into_inner);
        match &*backing {
            Backing::Memory(lines) => Ok(lines.concat()),
            Backing::File(path) => match fs::read_to_string(path) {
                Ok(contents) => Ok(contents),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
                Err(e) => Err(e.into()),
            },
        }
    }
}
