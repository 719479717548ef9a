/// Numbered save location. Slot 0 is the autosave.
pub type SlotId = u32;

pub const AUTOSAVE_SLOT: SlotId = 0;

pub fn make_savename(slot: SlotId) -> String {
    if slot == AUTOSAVE_SLOT {
        "autosave".to_string()
    } else {
        format!("file{slot}")
    }
}

/// True when `name` is what `make_savename` produces for some slot.
pub fn is_slot_savename(name: &str) -> bool {
    if name == "autosave" {
        return true;
    }
    match name.strip_prefix("file") {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autosave_slot_gets_its_own_name() {
        assert_eq!(make_savename(0), "autosave");
        assert_eq!(make_savename(1), "file1");
        assert_eq!(make_savename(20), "file20");
    }

    #[test]
    fn slot_names_are_recognized() {
        assert!(is_slot_savename("autosave"));
        assert!(is_slot_savename("file12"));
        assert!(!is_slot_savename("file"));
        assert!(!is_slot_savename("global"));
        assert!(!is_slot_savename("file1a"));
    }
}
