// Judgment journal: one JSON line per external grading attempt
use super::error::truncate_diagnostic;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JournalEntry<'a> {
    question_id: &'a str,
    stage: &'a str,
    outcome: &'a str,
    latency_ms: u64,
    diagnostic: String,
    timestamp: DateTime<Utc>,
}

pub struct JudgmentJournal {
    writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl JudgmentJournal {
    pub fn new(path: Option<PathBuf>) -> Self {
        let writer = path.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => Some(Arc::new(Mutex::new(BufWriter::new(file)))),
                Err(e) => {
                    warn!("Failed to open judgment journal {:?}: {}", path, e);
                    None
                }
            }
        });

        Self { writer }
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Appends one entry. `diagnostic` is capped before it is written.
    pub fn record(
        &self,
        question_id: &str,
        stage: &str,
        outcome: &str,
        latency_ms: u64,
        diagnostic: &str,
    ) {
        let Some(writer) = &self.writer else {
            return;
        };

        let entry = JournalEntry {
            question_id,
            stage,
            outcome,
            latency_ms,
            diagnostic: truncate_diagnostic(diagnostic),
            timestamp: Utc::now(),
        };

        if let Ok(mut writer) = writer.lock() {
            match serde_json::to_string(&entry) {
                Ok(json) => {
                    if let Err(e) = writeln!(writer, "{}", json) {
                        warn!("Failed to write journal entry: {}", e);
                    }
                    if let Err(e) = writer.flush() {
                        warn!("Failed to flush judgment journal: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Failed to serialize journal entry for {}: {}", question_id, e);
                }
            }
        }

        debug!(
            "Journal: question={} stage={} outcome={} latency_ms={}",
            question_id, stage, outcome, latency_ms
        );
    }
}

impl Default for JudgmentJournal {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for JudgmentJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgmentJournal")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
