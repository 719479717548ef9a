use thiserror::Error;

use crate::sync::payload::ActorId;

#[derive(Debug, Error)]
pub enum SaveSyncError {
    #[error("another reconciliation pass holds {0}")]
    Locked(String),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
}

impl SaveSyncError {
    pub fn code(&self) -> SyncErrorCode {
        match self {
            Self::Locked(_) => SyncErrorCode::E001Locked,
            Self::InvalidConfig(_) => SyncErrorCode::E002ConfigInvalid,
        }
    }
}

/// Failure to pull one summary field out of a save payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("payload has no `{0}` section")]
    MissingSection(&'static str),
    #[error("payload section `{section}` is malformed: {reason}")]
    MalformedSection {
        section: &'static str,
        reason: String,
    },
    #[error("actor {0} is not present in the actor table")]
    UnknownActor(ActorId),
    #[error("actor {actor} has no {kind} sprite assignment")]
    MissingSprite { actor: ActorId, kind: &'static str },
    #[error("system record has no usable frame count")]
    MissingFrameCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorCode {
    E001Locked,
    E002ConfigInvalid,
    E003IndexUnreadable,
    E004PayloadUnreadable,
    E005PartialExtraction,
}

impl SyncErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::E001Locked => "E001_LOCKED",
            Self::E002ConfigInvalid => "E002_CONFIG_INVALID",
            Self::E003IndexUnreadable => "E003_INDEX_UNREADABLE",
            Self::E004PayloadUnreadable => "E004_PAYLOAD_UNREADABLE",
            Self::E005PartialExtraction => "E005_PARTIAL_EXTRACTION",
        }
    }
}
