use anyhow::Result;

use crate::commands::{CommandReport, Workspace, ensure_save_dir};
use crate::sync::index::load_index;
use crate::sync::storage::SaveStorage;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn run() -> Result<CommandReport> {
    let workspace = Workspace::open()?;
    let mut report = CommandReport::new("status");
    workspace.describe(&mut report);

    report.detail(format!("config_file={}", workspace.paths.config_file.display()));
    report.detail(format!("extension={}", workspace.config.storage.extension));
    report.detail(format!(
        "max_battle_members={}",
        workspace.config.party.max_battle_members
    ));
    report.detail(format!("logs_dir={}", workspace.paths.logs_dir.display()));
    if !workspace.paths.system_data_file.exists() && workspace.config.game.title.is_none() {
        report.detail("game_title=unavailable (no data/System.json and no game.title)");
    }

    if !ensure_save_dir(&mut report, &workspace.paths) {
        return Ok(report);
    }

    let storage = &workspace.storage;
    let index = load_index(storage, &workspace.config.storage.index_name);
    if index.is_empty() {
        report.detail("index=empty");
    } else {
        report.detail(format!("index_entries={}", index.len()));
    }

    for slot in 0..=storage.max_savefiles() {
        let on_disk = storage.save_exists(slot);
        let entry = index.get(slot);
        if !on_disk && entry.is_none() {
            continue;
        }
        let playtime = entry.map_or("-", |e| e.playtime.as_str());
        report.detail(format!(
            "slot {slot} ({}): disk={} index={} playtime={playtime}",
            storage.make_savename(slot),
            yes_no(on_disk),
            yes_no(entry.is_some()),
        ));
    }

    // Entries past the configured range are never touched by a pass.
    for slot in index.slots().filter(|s| *s > storage.max_savefiles()) {
        report.detail(format!("slot {slot}: index entry beyond max_savefiles, left as is"));
    }

    Ok(report)
}
