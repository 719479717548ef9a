use anyhow::Result;
use tracing::warn;

use crate::commands::{CommandReport, Workspace, describe_action, ensure_save_dir};
use crate::sync::audit;
use crate::sync::lock::PassLock;
use crate::sync::reconcile::{load_and_repair, persist_if_changed};
use crate::sync::slot::SlotId;

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
}

fn join_slots(slots: &[SlotId]) -> String {
    if slots.is_empty() {
        return "none".to_string();
    }
    slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn run(opts: &SyncOptions) -> Result<CommandReport> {
    let workspace = Workspace::open()?;
    let mut report = CommandReport::new("sync");
    workspace.describe(&mut report);

    if !ensure_save_dir(&mut report, &workspace.paths) {
        return Ok(report);
    }

    let lock = PassLock::acquire(&workspace.paths.lock_file)?;
    report.detail(format!("lock_file={}", lock.path().display()));
    let ctx = workspace.synthesis_context();
    let outcome = load_and_repair(&workspace.storage, &ctx);

    for action in &outcome.actions {
        report.detail(describe_action(action));
    }
    report.detail(format!("restored_slots={}", join_slots(&outcome.restored_slots())));
    report.detail(format!("removed_slots={}", join_slots(&outcome.removed_slots())));
    report.detail(format!("changed={}", outcome.changed));
    report.detail(format!("entries={}", outcome.index.len()));

    if opts.dry_run {
        if outcome.changed {
            report.detail("dry-run: index not written");
        }
        return Ok(report);
    }

    let persisted = persist_if_changed(&workspace.storage, &ctx, &outcome)?;
    report.detail(format!("persisted={persisted}"));

    match audit::append_pass(&workspace.paths.logs_dir, "sync", &outcome, persisted) {
        Ok(path) => report.detail(format!("audit_log={}", path.display())),
        Err(err) => warn!(error = %format!("{err:#}"), "audit log append failed"),
    }

    drop(lock);
    Ok(report)
}
