use crate::error::SyncErrorCode;
use crate::sync::slot::SlotId;
use crate::sync::storage::SaveStorage;
use anyhow::{Context, Result, bail};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const UNKNOWN_PLAYTIME: &str = "??:??:??";

/// A sprite sheet name plus the cell index inside it. Persisted as
/// `[name, index]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portrait(pub String, pub u32);

/// Summary record the load menu shows for one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub characters: Vec<Portrait>,
    #[serde(default)]
    pub faces: Vec<Portrait>,
    #[serde(default = "unknown_playtime")]
    pub playtime: String,
    #[serde(default)]
    pub timestamp: i64,
    /// Fields written by the host that this tool does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn unknown_playtime() -> String {
    UNKNOWN_PLAYTIME.to_string()
}

impl IndexEntry {
    pub fn placeholder(title: &str, timestamp: i64) -> Self {
        Self {
            title: title.to_string(),
            characters: Vec::new(),
            faces: Vec::new(),
            playtime: unknown_playtime(),
            timestamp,
            extra: Map::new(),
        }
    }
}

/// Sparse slot -> entry mapping. Absent slots are simply missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SaveIndex {
    entries: BTreeMap<SlotId, IndexEntry>,
}

impl<'de> Deserialize<'de> for SaveIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(raw).map_err(D::Error::custom)
    }
}

/// Decode one stored entry. A `null` or undecodable entry only drops its
/// own slot; the rest of the index is kept as stored.
fn decode_entry(slot: SlotId, raw: Value) -> Option<IndexEntry> {
    if raw.is_null() {
        return None;
    }
    match serde_json::from_value::<IndexEntry>(raw) {
        Ok(entry) => Some(entry),
        Err(err) => {
            warn!(
                slot,
                code = SyncErrorCode::E003IndexUnreadable.as_str(),
                error = %err,
                "ignoring undecodable index entry"
            );
            None
        }
    }
}

impl SaveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let entries = match value {
            // Legacy layout: array position is the slot id, `null` for empty slots.
            Value::Array(slots) => slots
                .into_iter()
                .enumerate()
                .filter_map(|(slot, raw)| {
                    let slot = slot as SlotId;
                    decode_entry(slot, raw).map(|entry| (slot, entry))
                })
                .collect(),
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(key, raw)| {
                    let Ok(slot) = key.parse::<SlotId>() else {
                        warn!(
                            key = %key,
                            code = SyncErrorCode::E003IndexUnreadable.as_str(),
                            "ignoring index entry with a non-numeric slot key"
                        );
                        return None;
                    };
                    decode_entry(slot, raw).map(|entry| (slot, entry))
                })
                .collect(),
            other => bail!("save index has an unexpected shape: expected an object or array, found {other}"),
        };
        Ok(Self { entries })
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn get(&self, slot: SlotId) -> Option<&IndexEntry> {
        self.entries.get(&slot)
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.entries.contains_key(&slot)
    }

    pub fn insert(&mut self, slot: SlotId, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(slot, entry)
    }

    pub fn remove(&mut self, slot: SlotId) -> Option<IndexEntry> {
        self.entries.remove(&slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetch the persisted index. Any failure yields an empty index so every
/// present save gets rebuilt by the next reconciliation pass.
pub fn load_index<S: SaveStorage + ?Sized>(storage: &S, index_name: &str) -> SaveIndex {
    let loaded = storage
        .load_object(index_name)
        .and_then(SaveIndex::from_value);
    match loaded {
        Ok(index) => {
            info!(index = index_name, entries = index.len(), "save index loaded");
            index
        }
        Err(err) => {
            warn!(
                index = index_name,
                code = SyncErrorCode::E003IndexUnreadable.as_str(),
                error = %format!("{err:#}"),
                "could not load save index; starting from an empty one"
            );
            SaveIndex::new()
        }
    }
}

pub fn save_index<S: SaveStorage + ?Sized>(
    storage: &S,
    index_name: &str,
    index: &SaveIndex,
) -> Result<()> {
    storage
        .save_object(index_name, &index.to_value()?)
        .with_context(|| format!("failed to persist save index `{index_name}`"))
}
