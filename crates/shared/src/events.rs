//! Typed payloads for each event tag.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{CardConfigItem, EstimateValue, RoomSnapshot, Story, StoryId, UserId},
    protocol::EventType,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRoomPayload {
    #[serde(flatten)]
    pub room: RoomSnapshot,
    /// Issued after joining a password-protected room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickedPayload {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChangedPayload {
    pub story_id: StoryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRefPayload {
    pub story_id: StoryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySelectedPayload {
    #[serde(default)]
    pub story_id: Option<StoryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePayload {
    pub story_id: StoryId,
    pub value: EstimateValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernamePayload {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarPayload {
    pub avatar: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfigPayload {
    pub card_config: Vec<CardConfigItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoriesImportedPayload {
    pub stories: Vec<Story>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRejectedPayload {
    /// Absent when the authority could not parse the command at all.
    #[serde(default)]
    pub command: Option<RejectedCommand>,
    #[serde(default)]
    pub reason: String,
}

/// An event payload decoded according to its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    RoomCreated,
    JoinedRoom(JoinedRoomPayload),
    LeftRoom,
    ConnectionLost,
    Kicked(KickedPayload),
    StoryAdded(Story),
    StoryChanged(StoryChangedPayload),
    StoryTrashed(StoryRefPayload),
    StoryRestored(StoryRefPayload),
    StoryDeleted(StoryRefPayload),
    StorySelected(StorySelectedPayload),
    StoryEstimateGiven(EstimatePayload),
    StoryEstimateCleared(StoryRefPayload),
    Revealed(StoryRefPayload),
    NewEstimationRoundStarted(StoryRefPayload),
    ConsensusAchieved(EstimatePayload),
    UsernameSet(UsernamePayload),
    EmailSet(EmailPayload),
    AvatarSet(AvatarPayload),
    ExcludedFromEstimations,
    IncludedInEstimations,
    AutoRevealOn,
    AutoRevealOff,
    CardConfigSet(CardConfigPayload),
    PasswordSet,
    PasswordCleared,
    StoriesImported(StoriesImportedPayload),
    CommandRejected(CommandRejectedPayload),
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Result<T, serde_json::Error> {
    // a missing payload reads as an empty object so all-default payloads decode
    if payload.is_null() {
        return T::deserialize(&Value::Object(serde_json::Map::new()));
    }
    T::deserialize(payload)
}

impl Transition {
    pub fn decode(event_type: EventType, payload: &Value) -> Result<Self, serde_json::Error> {
        Ok(match event_type {
            EventType::RoomCreated => Self::RoomCreated,
            EventType::JoinedRoom => Self::JoinedRoom(decode(payload)?),
            EventType::LeftRoom => Self::LeftRoom,
            EventType::ConnectionLost => Self::ConnectionLost,
            EventType::Kicked => Self::Kicked(decode(payload)?),
            EventType::StoryAdded => Self::StoryAdded(decode(payload)?),
            EventType::StoryChanged => Self::StoryChanged(decode(payload)?),
            EventType::StoryTrashed => Self::StoryTrashed(decode(payload)?),
            EventType::StoryRestored => Self::StoryRestored(decode(payload)?),
            EventType::StoryDeleted => Self::StoryDeleted(decode(payload)?),
            EventType::StorySelected => Self::StorySelected(decode(payload)?),
            EventType::StoryEstimateGiven => Self::StoryEstimateGiven(decode(payload)?),
            EventType::StoryEstimateCleared => Self::StoryEstimateCleared(decode(payload)?),
            EventType::Revealed => Self::Revealed(decode(payload)?),
            EventType::NewEstimationRoundStarted => {
                Self::NewEstimationRoundStarted(decode(payload)?)
            }
            EventType::ConsensusAchieved => Self::ConsensusAchieved(decode(payload)?),
            EventType::UsernameSet => Self::UsernameSet(decode(payload)?),
            EventType::EmailSet => Self::EmailSet(decode(payload)?),
            EventType::AvatarSet => Self::AvatarSet(decode(payload)?),
            EventType::ExcludedFromEstimations => Self::ExcludedFromEstimations,
            EventType::IncludedInEstimations => Self::IncludedInEstimations,
            EventType::AutoRevealOn => Self::AutoRevealOn,
            EventType::AutoRevealOff => Self::AutoRevealOff,
            EventType::CardConfigSet => Self::CardConfigSet(decode(payload)?),
            EventType::PasswordSet => Self::PasswordSet,
            EventType::PasswordCleared => Self::PasswordCleared,
            EventType::StoriesImported => Self::StoriesImported(decode(payload)?),
            EventType::CommandRejected => Self::CommandRejected(decode(payload)?),
        })
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Self::RoomCreated => EventType::RoomCreated,
            Self::JoinedRoom(_) => EventType::JoinedRoom,
            Self::LeftRoom => EventType::LeftRoom,
            Self::ConnectionLost => EventType::ConnectionLost,
            Self::Kicked(_) => EventType::Kicked,
            Self::StoryAdded(_) => EventType::StoryAdded,
            Self::StoryChanged(_) => EventType::StoryChanged,
            Self::StoryTrashed(_) => EventType::StoryTrashed,
            Self::StoryRestored(_) => EventType::StoryRestored,
            Self::StoryDeleted(_) => EventType::StoryDeleted,
            Self::StorySelected(_) => EventType::StorySelected,
            Self::StoryEstimateGiven(_) => EventType::StoryEstimateGiven,
            Self::StoryEstimateCleared(_) => EventType::StoryEstimateCleared,
            Self::Revealed(_) => EventType::Revealed,
            Self::NewEstimationRoundStarted(_) => EventType::NewEstimationRoundStarted,
            Self::ConsensusAchieved(_) => EventType::ConsensusAchieved,
            Self::UsernameSet(_) => EventType::UsernameSet,
            Self::EmailSet(_) => EventType::EmailSet,
            Self::AvatarSet(_) => EventType::AvatarSet,
            Self::ExcludedFromEstimations => EventType::ExcludedFromEstimations,
            Self::IncludedInEstimations => EventType::IncludedInEstimations,
            Self::AutoRevealOn => EventType::AutoRevealOn,
            Self::AutoRevealOff => EventType::AutoRevealOff,
            Self::CardConfigSet(_) => EventType::CardConfigSet,
            Self::PasswordSet => EventType::PasswordSet,
            Self::PasswordCleared => EventType::PasswordCleared,
            Self::StoriesImported(_) => EventType::StoriesImported,
            Self::CommandRejected(_) => EventType::CommandRejected,
        }
    }
}
