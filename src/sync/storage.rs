use crate::sync::slot::{self, SlotId};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Storage primitives the reconciler relies on. The game runtime owns the
/// real format; implementations only need to hand back parsed JSON.
pub trait SaveStorage {
    fn load_object(&self, name: &str) -> Result<Value>;

    fn save_object(&self, name: &str, value: &Value) -> Result<()>;

    fn save_exists(&self, slot: SlotId) -> bool;

    /// Highest valid slot id.
    fn max_savefiles(&self) -> SlotId;

    fn make_savename(&self, slot: SlotId) -> String {
        slot::make_savename(slot)
    }
}

/// `<save_dir>/<name>.<extension>` JSON objects.
#[derive(Debug, Clone)]
pub struct FsStorage {
    save_dir: PathBuf,
    extension: String,
    max_savefiles: SlotId,
}

impl FsStorage {
    pub fn new(save_dir: impl Into<PathBuf>, extension: &str, max_savefiles: SlotId) -> Self {
        Self {
            save_dir: save_dir.into(),
            extension: extension.to_string(),
            max_savefiles,
        }
    }

    pub fn object_path(&self, name: &str) -> PathBuf {
        self.save_dir.join(format!("{name}.{}", self.extension))
    }
}

impl SaveStorage for FsStorage {
    fn load_object(&self, name: &str) -> Result<Value> {
        let path = self.object_path(name);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(parsed)
    }

    fn save_object(&self, name: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.save_dir)
            .with_context(|| format!("failed to create {}", self.save_dir.display()))?;
        let path = self.object_path(name);
        let data = serde_json::to_string(value)?;

        // Write beside the target and rename so a crash never leaves a torn file.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.save_dir)
            .with_context(|| format!("failed to stage {}", path.display()))?;
        tmp.write_all(data.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn save_exists(&self, slot: SlotId) -> bool {
        self.object_path(&self.make_savename(slot)).is_file()
    }

    fn max_savefiles(&self) -> SlotId {
        self.max_savefiles
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};

    /// In-memory storage double. Slots marked unreadable exist on "disk" but
    /// fail to load.
    #[derive(Debug, Default)]
    pub struct MemoryStorage {
        objects: RefCell<BTreeMap<String, Value>>,
        unreadable: RefCell<BTreeSet<SlotId>>,
        loads: RefCell<Vec<String>>,
        max_savefiles: SlotId,
    }

    impl MemoryStorage {
        pub fn new(max_savefiles: SlotId) -> Self {
            Self {
                max_savefiles,
                ..Self::default()
            }
        }

        pub fn put(&self, name: &str, value: Value) {
            self.objects.borrow_mut().insert(name.to_string(), value);
        }

        pub fn put_slot(&self, slot: SlotId, value: Value) {
            self.put(&slot::make_savename(slot), value);
        }

        pub fn delete_slot(&self, slot: SlotId) {
            self.objects.borrow_mut().remove(&slot::make_savename(slot));
            self.unreadable.borrow_mut().remove(&slot);
        }

        pub fn mark_unreadable(&self, slot: SlotId) {
            self.unreadable.borrow_mut().insert(slot);
        }

        pub fn get(&self, name: &str) -> Option<Value> {
            self.objects.borrow().get(name).cloned()
        }

        pub fn loads(&self) -> Vec<String> {
            self.loads.borrow().clone()
        }
    }

    impl SaveStorage for MemoryStorage {
        fn load_object(&self, name: &str) -> Result<Value> {
            self.loads.borrow_mut().push(name.to_string());
            let unreadable = self
                .unreadable
                .borrow()
                .iter()
                .any(|slot| slot::make_savename(*slot) == name);
            if unreadable {
                anyhow::bail!("{name} is corrupt");
            }
            self.get(name)
                .with_context(|| format!("{name} does not exist"))
        }

        fn save_object(&self, name: &str, value: &Value) -> Result<()> {
            self.put(name, value.clone());
            Ok(())
        }

        fn save_exists(&self, slot: SlotId) -> bool {
            self.unreadable.borrow().contains(&slot)
                || self.objects.borrow().contains_key(&slot::make_savename(slot))
        }

        fn max_savefiles(&self) -> SlotId {
            self.max_savefiles
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_object_roundtrip() {
        let tmp = tempdir().expect("tempdir");
        let storage = FsStorage::new(tmp.path().join("save"), "json", 20);

        storage
            .save_object("global", &json!({"1": {"title": "Quest"}}))
            .expect("save");
        let loaded = storage.load_object("global").expect("load");
        assert_eq!(loaded["1"]["title"], "Quest");
        assert!(tmp.path().join("save/global.json").is_file());
    }

    #[test]
    fn save_exists_follows_slot_file_names() {
        let tmp = tempdir().expect("tempdir");
        let storage = FsStorage::new(tmp.path(), "rpgsave", 20);
        fs::write(tmp.path().join("autosave.rpgsave"), "{}").expect("write autosave");
        fs::write(tmp.path().join("file3.rpgsave"), "{}").expect("write file3");

        assert!(storage.save_exists(0));
        assert!(storage.save_exists(3));
        assert!(!storage.save_exists(1));
    }

    #[test]
    fn load_object_reports_corrupt_json() {
        let tmp = tempdir().expect("tempdir");
        let storage = FsStorage::new(tmp.path(), "json", 20);
        fs::write(tmp.path().join("file1.json"), "{not json").expect("write");

        let err = storage.load_object("file1").expect_err("corrupt");
        assert!(format!("{err:#}").contains("failed to parse"));
    }
}
