use crate::sync::reconcile::{ReconcileOutcome, SlotAction};
use crate::sync::util::now_epoch_millis;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const AUDIT_LOG_NAME: &str = "save_sync_audit.log";

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent<'a> {
    pub at_epoch_millis: i64,
    pub command: &'a str,
    pub changed: bool,
    pub persisted: bool,
    pub entries: usize,
    pub actions: &'a [SlotAction],
}

pub fn audit_log_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(AUDIT_LOG_NAME)
}

/// Append one JSON line describing a finished pass.
pub fn append_pass(
    logs_dir: &Path,
    command: &str,
    outcome: &ReconcileOutcome,
    persisted: bool,
) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("failed to create {}", logs_dir.display()))?;
    let event = AuditEvent {
        at_epoch_millis: now_epoch_millis(),
        command,
        changed: outcome.changed,
        persisted,
        entries: outcome.index.len(),
        actions: &outcome.actions,
    };

    let line = format!("{}\n", serde_json::to_string(&event)?);
    let path = audit_log_path(logs_dir);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(path)
}
