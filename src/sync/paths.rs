use crate::sync::config::SyncConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SyncPaths {
    pub game_dir: PathBuf,
    pub config_file: PathBuf,
    pub save_dir: PathBuf,
    pub system_data_file: PathBuf,
    pub logs_dir: PathBuf,
    pub lock_file: PathBuf,
}

fn env_path(var: &str) -> Option<PathBuf> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(PathBuf::from(v.trim())),
        _ => None,
    }
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    env_path(var).unwrap_or(fallback)
}

pub fn resolve_game_dir() -> Result<PathBuf> {
    if let Some(dir) = env_path("SAVE_SYNC_GAME_DIR") {
        return Ok(dir);
    }
    env::current_dir().context("current directory could not be resolved")
}

pub fn config_file_path(game_dir: &Path) -> PathBuf {
    env_or_default_path("SAVE_SYNC_CONFIG_PATH", game_dir.join("save_sync.toml"))
}

/// Relative paths in config are anchored at the game directory.
fn anchor(game_dir: &Path, configured: &str) -> PathBuf {
    let path = PathBuf::from(configured);
    if path.is_absolute() {
        path
    } else {
        game_dir.join(path)
    }
}

pub fn resolve_paths(game_dir: &Path, cfg: &SyncConfig) -> SyncPaths {
    let save_dir = anchor(game_dir, &cfg.storage.save_dir);
    let logs_dir = env_or_default_path("SAVE_SYNC_LOGS_DIR", game_dir.join("logs"));
    SyncPaths {
        game_dir: game_dir.to_path_buf(),
        config_file: config_file_path(game_dir),
        system_data_file: game_dir.join("data").join("System.json"),
        lock_file: save_dir.join(".save_sync.lock"),
        logs_dir,
        save_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_save_dir_is_anchored_at_game_dir() {
        assert_eq!(
            anchor(Path::new("/games/quest"), "save"),
            PathBuf::from("/games/quest/save")
        );
        assert_eq!(
            anchor(Path::new("/games/quest"), "/var/saves"),
            PathBuf::from("/var/saves")
        );
    }

    #[test]
    fn lock_and_system_data_live_where_the_game_expects() {
        let paths = resolve_paths(Path::new("/games/quest"), &SyncConfig::default());
        assert_eq!(paths.save_dir, PathBuf::from("/games/quest/save"));
        assert_eq!(
            paths.lock_file,
            PathBuf::from("/games/quest/save/.save_sync.lock")
        );
        assert_eq!(
            paths.system_data_file,
            PathBuf::from("/games/quest/data/System.json")
        );
    }

    #[test]
    fn audit_logs_default_outside_the_save_dir() {
        let paths = resolve_paths(Path::new("/games/quest"), &SyncConfig::default());
        assert_eq!(paths.logs_dir, PathBuf::from("/games/quest/logs"));
        assert!(!paths.logs_dir.starts_with(&paths.save_dir));
    }
}
