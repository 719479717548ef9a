use crate::error::SaveSyncError;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock held for the duration of one reconciliation pass.
/// Released on drop.
#[derive(Debug)]
pub struct PassLock {
    file: File,
    path: PathBuf,
}

impl PassLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        if file.try_lock_exclusive().is_err() {
            return Err(SaveSyncError::Locked(path.display().to_string()).into());
        }
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PassLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn second_lock_on_same_path_is_refused() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("save/.save_sync.lock");

        let held = PassLock::acquire(&path).expect("first lock");
        let err = PassLock::acquire(&path).expect_err("second lock");
        assert!(matches!(
            err.downcast_ref::<SaveSyncError>(),
            Some(SaveSyncError::Locked(_))
        ));

        drop(held);
        PassLock::acquire(&path).expect("lock after release");
    }
}
