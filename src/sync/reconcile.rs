use crate::error::SyncErrorCode;
use crate::sync::extract::extract_summary;
use crate::sync::index::{IndexEntry, SaveIndex, load_index, save_index};
use crate::sync::payload::SavePayload;
use crate::sync::slot::SlotId;
use crate::sync::storage::SaveStorage;
use crate::sync::util::now_epoch_millis;
use anyhow::Result;
use serde::Serialize;
use tracing::{error, info, warn};

/// Everything entry synthesis needs besides storage.
#[derive(Debug, Clone)]
pub struct SynthesisContext {
    pub index_name: String,
    pub game_title: String,
    pub max_battle_members: usize,
    pub clock: fn() -> i64,
}

impl SynthesisContext {
    pub fn new(index_name: &str, game_title: &str, max_battle_members: usize) -> Self {
        Self {
            index_name: index_name.to_string(),
            game_title: game_title.to_string(),
            max_battle_members,
            clock: now_epoch_millis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisStatus {
    Restored,
    Partial { failed_fields: Vec<&'static str> },
    Placeholder { reason: String },
}

#[derive(Debug, Clone)]
pub struct Synthesis {
    pub entry: IndexEntry,
    pub status: SynthesisStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotDivergence {
    /// Save file present, index entry missing.
    MissingEntry,
    /// Index entry present, save file missing.
    StaleEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SlotActionKind {
    Restored(SynthesisStatus),
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAction {
    pub slot: SlotId,
    #[serde(flatten)]
    pub kind: SlotActionKind,
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub index: SaveIndex,
    pub changed: bool,
    pub actions: Vec<SlotAction>,
}

impl ReconcileOutcome {
    pub fn restored_slots(&self) -> Vec<SlotId> {
        self.actions
            .iter()
            .filter(|a| matches!(a.kind, SlotActionKind::Restored(_)))
            .map(|a| a.slot)
            .collect()
    }

    pub fn removed_slots(&self) -> Vec<SlotId> {
        self.actions
            .iter()
            .filter(|a| a.kind == SlotActionKind::Removed)
            .map(|a| a.slot)
            .collect()
    }
}

/// Slots whose index presence disagrees with disk presence, ascending.
pub fn divergences<S: SaveStorage + ?Sized>(
    storage: &S,
    index: &SaveIndex,
) -> Vec<(SlotId, SlotDivergence)> {
    (0..=storage.max_savefiles())
        .filter_map(|slot| {
            match (storage.save_exists(slot), index.contains(slot)) {
                (true, false) => Some((slot, SlotDivergence::MissingEntry)),
                (false, true) => Some((slot, SlotDivergence::StaleEntry)),
                _ => None,
            }
        })
        .collect()
}

/// Build an index entry for `slot` from its save payload. Never fails: an
/// unreadable payload yields a placeholder, a partly readable one keeps every
/// field that could be extracted.
pub fn synthesize<S: SaveStorage + ?Sized>(
    storage: &S,
    slot: SlotId,
    ctx: &SynthesisContext,
) -> Synthesis {
    warn!(slot, "restoring save info");
    let mut entry = IndexEntry::placeholder(&ctx.game_title, (ctx.clock)());

    let save_name = storage.make_savename(slot);
    let payload = match storage.load_object(&save_name) {
        Ok(raw) => SavePayload::new(raw),
        Err(err) => {
            error!(
                slot,
                save_name = %save_name,
                code = SyncErrorCode::E004PayloadUnreadable.as_str(),
                error = %format!("{err:#}"),
                "could not load save payload; keeping placeholder info"
            );
            warn!(slot, "the save can still be loaded from the menu");
            return Synthesis {
                entry,
                status: SynthesisStatus::Placeholder {
                    reason: format!("{err:#}"),
                },
            };
        }
    };

    let extraction = extract_summary(&payload, ctx.max_battle_members);
    let failed_fields: Vec<&'static str> = extraction
        .failures()
        .into_iter()
        .map(|(field, err)| {
            error!(
                slot,
                field,
                save_name = %save_name,
                code = SyncErrorCode::E005PartialExtraction.as_str(),
                error = %err,
                "failed to restore save info field"
            );
            field
        })
        .collect();

    entry.characters = extraction.characters.into_value();
    entry.faces = extraction.faces.into_value();
    entry.playtime = extraction.playtime.into_value();

    let status = if failed_fields.is_empty() {
        info!(slot, "save info restored");
        SynthesisStatus::Restored
    } else {
        warn!(slot, "the save can still be loaded from the menu");
        SynthesisStatus::Partial { failed_fields }
    };
    Synthesis { entry, status }
}

/// One pass over every slot: restore entries for orphaned saves, drop entries
/// whose save is gone. Slots are visited in ascending order.
pub fn reconcile<S: SaveStorage + ?Sized>(
    storage: &S,
    mut index: SaveIndex,
    ctx: &SynthesisContext,
) -> ReconcileOutcome {
    let mut actions = Vec::new();
    for (slot, divergence) in divergences(storage, &index) {
        let kind = match divergence {
            SlotDivergence::MissingEntry => {
                let synthesis = synthesize(storage, slot, ctx);
                index.insert(slot, synthesis.entry);
                SlotActionKind::Restored(synthesis.status)
            }
            SlotDivergence::StaleEntry => {
                info!(slot, "removing index entry for missing save");
                index.remove(slot);
                SlotActionKind::Removed
            }
        };
        actions.push(SlotAction { slot, kind });
    }

    ReconcileOutcome {
        index,
        changed: !actions.is_empty(),
        actions,
    }
}

pub fn load_and_repair<S: SaveStorage + ?Sized>(
    storage: &S,
    ctx: &SynthesisContext,
) -> ReconcileOutcome {
    let index = load_index(storage, &ctx.index_name);
    reconcile(storage, index, ctx)
}

/// Write the index back only when the pass changed it.
pub fn persist_if_changed<S: SaveStorage + ?Sized>(
    storage: &S,
    ctx: &SynthesisContext,
    outcome: &ReconcileOutcome,
) -> Result<bool> {
    if !outcome.changed {
        return Ok(false);
    }
    save_index(storage, &ctx.index_name, &outcome.index)?;
    info!(
        index = %ctx.index_name,
        entries = outcome.index.len(),
        "save index persisted"
    );
    Ok(true)
}
