use anyhow::Result;

use crate::commands::{CommandReport, Workspace, ensure_save_dir};
use crate::sync::index::load_index;
use crate::sync::reconcile::{SlotDivergence, divergences};

#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    pub strict: bool,
}

pub fn run(opts: &VerifyOptions) -> Result<CommandReport> {
    let workspace = Workspace::open()?;
    let mut report = CommandReport::new("verify");
    workspace.describe(&mut report);

    if !ensure_save_dir(&mut report, &workspace.paths) {
        return Ok(report);
    }

    let index = load_index(&workspace.storage, &workspace.config.storage.index_name);
    let found = divergences(&workspace.storage, &index);
    for (slot, divergence) in &found {
        let text = match divergence {
            SlotDivergence::MissingEntry => {
                format!("slot {slot}: save present, index entry missing")
            }
            SlotDivergence::StaleEntry => {
                format!("slot {slot}: index entry present, save missing")
            }
        };
        report.detail(text);
    }
    report.detail(format!("divergent_slots={}", found.len()));

    if opts.strict && !found.is_empty() {
        report.issue(format!(
            "strict verify failed: {} slot(s) out of sync; run `save-sync sync`",
            found.len()
        ));
    }

    Ok(report)
}
