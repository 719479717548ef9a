use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct SystemData {
    #[serde(rename = "gameTitle", default)]
    game_title: String,
}

fn read_game_title(system_data_file: &Path) -> Result<String> {
    let raw = fs::read_to_string(system_data_file)
        .with_context(|| format!("failed to read {}", system_data_file.display()))?;
    let data: SystemData = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", system_data_file.display()))?;
    Ok(data.game_title)
}

/// Title stamped onto synthesized entries: configured value first, then the
/// game's own system data, then an empty string.
pub fn resolve_game_title(configured: Option<&str>, system_data_file: &Path) -> String {
    if let Some(title) = configured {
        return title.to_string();
    }
    match read_game_title(system_data_file) {
        Ok(title) => title,
        Err(err) => {
            warn!(
                error = %format!("{err:#}"),
                "game title unavailable; restored entries get an empty title"
            );
            String::new()
        }
    }
}
