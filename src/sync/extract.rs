//! Summary extraction: portraits and playtime from a loaded save payload.
//!
//! Every field is extracted on its own and reported as a [`FieldOutcome`], so
//! a broken actor table still lets the playtime through and vice versa.

use crate::error::ExtractError;
use crate::sync::index::{Portrait, UNKNOWN_PLAYTIME};
use crate::sync::payload::{ActorId, ActorRecord, SavePayload};
use tracing::debug;

pub const FRAMES_PER_SECOND: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome<T> {
    Recovered(T),
    Defaulted { value: T, error: ExtractError },
}

impl<T> FieldOutcome<T> {
    pub fn from_result(result: Result<T, ExtractError>, default: T) -> Self {
        match result {
            Ok(value) => Self::Recovered(value),
            Err(error) => Self::Defaulted {
                value: default,
                error,
            },
        }
    }

    pub fn error(&self) -> Option<&ExtractError> {
        match self {
            Self::Recovered(_) => None,
            Self::Defaulted { error, .. } => Some(error),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Recovered(value) | Self::Defaulted { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryExtraction {
    pub characters: FieldOutcome<Vec<Portrait>>,
    pub faces: FieldOutcome<Vec<Portrait>>,
    pub playtime: FieldOutcome<String>,
}

impl SummaryExtraction {
    /// Names and errors of every field that fell back to its default.
    pub fn failures(&self) -> Vec<(&'static str, &ExtractError)> {
        [
            ("characters", self.characters.error()),
            ("faces", self.faces.error()),
            ("playtime", self.playtime.error()),
        ]
        .into_iter()
        .filter_map(|(field, err)| err.map(|e| (field, e)))
        .collect()
    }
}

pub fn extract_summary(payload: &SavePayload, max_battle_members: usize) -> SummaryExtraction {
    let members = extract_party_members(payload, max_battle_members);
    let characters = members
        .clone()
        .and_then(|actors| extract_characters(&actors));
    let faces = members.and_then(|actors| extract_faces(&actors));

    SummaryExtraction {
        characters: FieldOutcome::from_result(characters, Vec::new()),
        faces: FieldOutcome::from_result(faces, Vec::new()),
        playtime: FieldOutcome::from_result(
            extract_playtime(payload),
            UNKNOWN_PLAYTIME.to_string(),
        ),
    }
}

/// Active party in roster order, capped at the battle party size.
pub fn extract_party_members(
    payload: &SavePayload,
    max_battle_members: usize,
) -> Result<Vec<(ActorId, ActorRecord)>, ExtractError> {
    let party = payload.party()?;
    let table = payload.actors()?;
    party
        .active_member_ids(max_battle_members)
        .iter()
        .map(|&id| -> Result<_, ExtractError> {
            let actor = table.actor(id)?;
            debug!(
                actor = id,
                name = actor.name.as_deref().unwrap_or_default(),
                "resolved party member"
            );
            Ok((id, actor))
        })
        .collect()
}

pub fn extract_characters(
    members: &[(ActorId, ActorRecord)],
) -> Result<Vec<Portrait>, ExtractError> {
    members
        .iter()
        .map(|(id, actor)| match (&actor.character_name, actor.character_index) {
            (Some(name), Some(index)) => Ok(Portrait(name.clone(), index)),
            _ => Err(ExtractError::MissingSprite {
                actor: *id,
                kind: "character",
            }),
        })
        .collect()
}

pub fn extract_faces(
    members: &[(ActorId, ActorRecord)],
) -> Result<Vec<Portrait>, ExtractError> {
    members
        .iter()
        .map(|(id, actor)| match (&actor.face_name, actor.face_index) {
            (Some(name), Some(index)) => Ok(Portrait(name.clone(), index)),
            _ => Err(ExtractError::MissingSprite {
                actor: *id,
                kind: "face",
            }),
        })
        .collect()
}

pub fn extract_playtime(payload: &SavePayload) -> Result<String, ExtractError> {
    let frames = payload.system()?.frames()?;
    Ok(format_playtime(frames))
}

pub fn format_playtime(frames: u64) -> String {
    let total_seconds = frames / FRAMES_PER_SECOND;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
