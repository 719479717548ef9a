//! Minimal structural view of a full save payload.
//!
//! The save format itself belongs to the game runtime. This module only
//! describes the three sections the summary extractor reads and decodes each
//! one on demand, so a malformed `system` record never hides a readable party.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ExtractError;

pub type ActorId = u32;

/// `party` section: active roster in front-to-back order.
#[derive(Debug, Clone, Deserialize)]
pub struct PartyRoster {
    #[serde(rename = "_actors")]
    pub actors: Vec<ActorId>,
    #[serde(rename = "_maxBattleMembers", default)]
    pub max_battle_members: Option<usize>,
}

impl PartyRoster {
    /// Active member ids, truncated to the battle party size.
    pub fn active_member_ids(&self, fallback_max: usize) -> &[ActorId] {
        let max = self.max_battle_members.unwrap_or(fallback_max);
        &self.actors[..self.actors.len().min(max)]
    }
}

/// One element of `actors._data`, holding the current sprite assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorRecord {
    #[serde(rename = "_name", default)]
    pub name: Option<String>,
    #[serde(rename = "_characterName", default)]
    pub character_name: Option<String>,
    #[serde(rename = "_characterIndex", default)]
    pub character_index: Option<u32>,
    #[serde(rename = "_faceName", default)]
    pub face_name: Option<String>,
    #[serde(rename = "_faceIndex", default)]
    pub face_index: Option<u32>,
}

/// `actors` section. `_data` is indexed by actor id; unused ids hold `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorTable {
    #[serde(rename = "_data")]
    pub data: Vec<Option<Value>>,
}

impl ActorTable {
    pub fn actor(&self, id: ActorId) -> Result<ActorRecord, ExtractError> {
        let raw = self
            .data
            .get(id as usize)
            .and_then(Option::as_ref)
            .ok_or(ExtractError::UnknownActor(id))?;
        if !raw.is_object() {
            return Err(ExtractError::UnknownActor(id));
        }
        ActorRecord::deserialize(raw).map_err(|err| ExtractError::MalformedSection {
            section: "actors",
            reason: format!("actor {id}: {err}"),
        })
    }
}

/// `system` section. Only the frame counter matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemRecord {
    #[serde(rename = "_framesOnSave", default)]
    pub frames_on_save: Option<Value>,
}

impl SystemRecord {
    pub fn frames(&self) -> Result<u64, ExtractError> {
        self.frames_on_save
            .as_ref()
            .and_then(Value::as_u64)
            .ok_or(ExtractError::MissingFrameCount)
    }
}

#[derive(Debug, Clone)]
pub struct SavePayload {
    raw: Value,
}

impl SavePayload {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn party(&self) -> Result<PartyRoster, ExtractError> {
        self.section("party")
    }

    pub fn actors(&self) -> Result<ActorTable, ExtractError> {
        self.section("actors")
    }

    pub fn system(&self) -> Result<SystemRecord, ExtractError> {
        self.section("system")
    }

    fn section<T: DeserializeOwned>(&self, name: &'static str) -> Result<T, ExtractError> {
        let value = self
            .raw
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or(ExtractError::MissingSection(name))?;
        T::deserialize(value).map_err(|err| ExtractError::MalformedSection {
            section: name,
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roster_falls_back_to_configured_battle_size() {
        let payload = SavePayload::new(json!({"party": {"_actors": [1, 2, 3, 4, 5]}}));
        let party = payload.party().expect("party");
        assert_eq!(party.active_member_ids(4), &[1, 2, 3, 4]);
    }

    #[test]
    fn roster_prefers_saved_battle_size() {
        let payload = SavePayload::new(json!({
            "party": {"_actors": [7, 3, 5], "_maxBattleMembers": 2}
        }));
        let party = payload.party().expect("party");
        assert_eq!(party.active_member_ids(4), &[7, 3]);
    }

    #[test]
    fn null_actor_slot_is_unknown() {
        let payload = SavePayload::new(json!({"actors": {"_data": [null, null]}}));
        let table = payload.actors().expect("actors");
        assert_eq!(table.actor(1).unwrap_err(), ExtractError::UnknownActor(1));
        assert_eq!(table.actor(9).unwrap_err(), ExtractError::UnknownActor(9));
    }

    #[test]
    fn missing_and_malformed_sections_are_distinguished() {
        let payload = SavePayload::new(json!({"party": "oops"}));
        assert!(matches!(
            payload.party(),
            Err(ExtractError::MalformedSection { section: "party", .. })
        ));
        assert_eq!(
            payload.system().unwrap_err(),
            ExtractError::MissingSection("system")
        );
    }

    #[test]
    fn frame_count_must_be_a_non_negative_integer() {
        let payload = SavePayload::new(json!({"system": {"_framesOnSave": -5}}));
        let system = payload.system().expect("system");
        assert_eq!(system.frames().unwrap_err(), ExtractError::MissingFrameCount);

        let payload = SavePayload::new(json!({"system": {"@": "Game_System"}}));
        let system = payload.system().expect("system");
        assert_eq!(system.frames().unwrap_err(), ExtractError::MissingFrameCount);
    }
}
