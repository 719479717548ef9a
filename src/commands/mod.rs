pub mod status;
pub mod sync;
pub mod verify;

use anyhow::Result;
use serde::Serialize;

use crate::sync::config::{SyncConfig, load_config};
use crate::sync::paths::{SyncPaths, resolve_game_dir, resolve_paths};
use crate::sync::reconcile::{SlotAction, SlotActionKind, SynthesisContext, SynthesisStatus};
use crate::sync::storage::FsStorage;
use crate::sync::system_data::resolve_game_title;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }
}

/// Resolved config, paths and storage for one command invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: SyncConfig,
    pub paths: SyncPaths,
    pub storage: FsStorage,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let game_dir = resolve_game_dir()?;
        let config = load_config(&game_dir)?;
        let paths = resolve_paths(&game_dir, &config);
        let storage = FsStorage::new(
            &paths.save_dir,
            &config.storage.extension,
            config.storage.max_savefiles,
        );
        Ok(Self {
            config,
            paths,
            storage,
        })
    }

    pub fn synthesis_context(&self) -> SynthesisContext {
        let title = resolve_game_title(
            self.config.game.title.as_deref(),
            &self.paths.system_data_file,
        );
        SynthesisContext::new(
            &self.config.storage.index_name,
            &title,
            self.config.party.max_battle_members,
        )
    }

    pub fn describe(&self, report: &mut CommandReport) {
        report.detail(format!("game_dir={}", self.paths.game_dir.display()));
        report.detail(format!("save_dir={}", self.paths.save_dir.display()));
        report.detail(format!("index_name={}", self.config.storage.index_name));
        report.detail(format!("max_savefiles={}", self.config.storage.max_savefiles));
    }
}

pub fn ensure_save_dir(report: &mut CommandReport, paths: &SyncPaths) -> bool {
    if paths.save_dir.is_dir() {
        return true;
    }

    report.issue(format!(
        "save dir does not exist: {} (set SAVE_SYNC_GAME_DIR or storage.save_dir)",
        paths.save_dir.display()
    ));
    false
}

pub fn describe_action(action: &SlotAction) -> String {
    match &action.kind {
        SlotActionKind::Removed => format!("slot {}: removed stale index entry", action.slot),
        SlotActionKind::Restored(SynthesisStatus::Restored) => {
            format!("slot {}: restored index entry", action.slot)
        }
        SlotActionKind::Restored(SynthesisStatus::Partial { failed_fields }) => format!(
            "slot {}: restored index entry with defaults for {}",
            action.slot,
            failed_fields.join(",")
        ),
        SlotActionKind::Restored(SynthesisStatus::Placeholder { reason }) => format!(
            "slot {}: restored placeholder index entry (save unreadable: {reason})",
            action.slot
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_marks_report_failed() {
        let mut report = CommandReport::new("verify");
        report.detail("slot 1: ok");
        assert!(report.ok);
        report.issue("slot 2 diverges");
        assert!(!report.ok);
        assert_eq!(report.issues, vec!["slot 2 diverges".to_string()]);
    }

    #[test]
    fn partial_restore_names_defaulted_fields() {
        let action = SlotAction {
            slot: 4,
            kind: SlotActionKind::Restored(SynthesisStatus::Partial {
                failed_fields: vec!["characters", "faces"],
            }),
        };
        assert_eq!(
            describe_action(&action),
            "slot 4: restored index entry with defaults for characters,faces"
        );
    }
}
