use crate::error::SaveSyncError;
use crate::sync::paths::config_file_path;
use crate::sync::slot::{SlotId, is_slot_savename};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub save_dir: String,
    pub extension: String,
    pub index_name: String,
    pub max_savefiles: SlotId,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: "save".to_string(),
            extension: "json".to_string(),
            index_name: "global".to_string(),
            max_savefiles: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Used when a save does not record its own battle party size.
    pub max_battle_members: usize,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            max_battle_members: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    pub storage: StorageConfig,
    pub party: PartyConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSyncConfig {
    storage: Option<StorageConfig>,
    party: Option<PartyConfig>,
    game: Option<GameConfig>,
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_optional_string(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    anyhow!(SaveSyncError::InvalidConfig(message.into()))
}

pub fn validate(cfg: &SyncConfig) -> Result<()> {
    if cfg.storage.max_savefiles == 0 {
        return Err(invalid("storage.max_savefiles must be >= 1"));
    }
    if cfg.party.max_battle_members == 0 {
        return Err(invalid("party.max_battle_members must be >= 1"));
    }
    let ext = cfg.storage.extension.trim();
    if ext.is_empty() || ext.starts_with('.') {
        return Err(invalid(
            "storage.extension must be non-empty and given without a leading dot",
        ));
    }
    let index_name = cfg.storage.index_name.trim();
    if index_name.is_empty() {
        return Err(invalid("storage.index_name cannot be empty"));
    }
    if is_slot_savename(index_name) {
        return Err(invalid(format!(
            "storage.index_name `{index_name}` collides with a save slot name"
        )));
    }
    if cfg.storage.save_dir.trim().is_empty() {
        return Err(invalid("storage.save_dir cannot be empty"));
    }
    Ok(())
}

fn merge_file_config(base: &mut SyncConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: PartialSyncConfig = toml::from_str(&raw)
        .map_err(|err| invalid(format!("failed to parse {}: {err}", path.display())))?;
    if let Some(storage) = parsed.storage {
        base.storage = storage;
    }
    if let Some(party) = parsed.party {
        base.party = party;
    }
    if let Some(game) = parsed.game {
        base.game = game;
    }
    Ok(())
}

fn apply_env_overrides(cfg: &mut SyncConfig) {
    cfg.storage.save_dir = env_or_string("SAVE_SYNC_SAVE_DIR", &cfg.storage.save_dir);
    cfg.storage.extension = env_or_string("SAVE_SYNC_SAVE_EXTENSION", &cfg.storage.extension);
    cfg.storage.index_name = env_or_string("SAVE_SYNC_INDEX_NAME", &cfg.storage.index_name);
    cfg.storage.max_savefiles = env_or_u32("SAVE_SYNC_MAX_SAVEFILES", cfg.storage.max_savefiles);
    cfg.party.max_battle_members = env_or_usize(
        "SAVE_SYNC_MAX_BATTLE_MEMBERS",
        cfg.party.max_battle_members,
    );
    cfg.game.title = env_optional_string("SAVE_SYNC_GAME_TITLE", cfg.game.title.take());
}

pub fn load_config(game_dir: &Path) -> Result<SyncConfig> {
    let mut cfg = SyncConfig::default();
    merge_file_config(&mut cfg, &config_file_path(game_dir))?;
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}
