use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    domain::{CardConfigItem, EstimateValue, RoomId, StoryId, UserId},
    error::EventTableError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandName {
    JoinRoom,
    LeaveRoom,
    AddStory,
    ChangeStory,
    TrashStory,
    RestoreStory,
    DeleteStory,
    SelectStory,
    GiveStoryEstimate,
    ClearStoryEstimate,
    NewEstimationRound,
    Reveal,
    SetUsername,
    SetEmail,
    SetAvatar,
    SetCardConfig,
    SetPassword,
    ToggleExclude,
    ToggleAutoReveal,
    Kick,
    ImportStories,
}

impl CommandName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JoinRoom => "joinRoom",
            Self::LeaveRoom => "leaveRoom",
            Self::AddStory => "addStory",
            Self::ChangeStory => "changeStory",
            Self::TrashStory => "trashStory",
            Self::RestoreStory => "restoreStory",
            Self::DeleteStory => "deleteStory",
            Self::SelectStory => "selectStory",
            Self::GiveStoryEstimate => "giveStoryEstimate",
            Self::ClearStoryEstimate => "clearStoryEstimate",
            Self::NewEstimationRound => "newEstimationRound",
            Self::Reveal => "reveal",
            Self::SetUsername => "setUsername",
            Self::SetEmail => "setEmail",
            Self::SetAvatar => "setAvatar",
            Self::SetCardConfig => "setCardConfig",
            Self::SetPassword => "setPassword",
            Self::ToggleExclude => "toggleExclude",
            Self::ToggleAutoReveal => "toggleAutoReveal",
            Self::Kick => "kick",
            Self::ImportStories => "importStories",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<u32>,
    /// Clear-text password typed by the user. Never sent together with `token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Command name and payload, serialized as `{"name": .., "payload": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "name",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum CommandBody {
    JoinRoom(JoinRoomPayload),
    LeaveRoom {},
    AddStory {
        title: String,
        description: String,
    },
    ChangeStory {
        story_id: StoryId,
        title: String,
        description: String,
    },
    TrashStory {
        story_id: StoryId,
    },
    RestoreStory {
        story_id: StoryId,
    },
    DeleteStory {
        story_id: StoryId,
    },
    SelectStory {
        story_id: StoryId,
    },
    GiveStoryEstimate {
        story_id: StoryId,
        value: EstimateValue,
    },
    ClearStoryEstimate {
        story_id: StoryId,
    },
    NewEstimationRound {
        story_id: StoryId,
    },
    Reveal {
        story_id: StoryId,
    },
    SetUsername {
        username: String,
    },
    SetEmail {
        email: String,
    },
    SetAvatar {
        avatar: u32,
    },
    SetCardConfig {
        card_config: Vec<CardConfigItem>,
    },
    SetPassword {
        password: String,
    },
    ToggleExclude {},
    ToggleAutoReveal {},
    Kick {
        user_id: UserId,
    },
    ImportStories {
        data: String,
    },
}

impl CommandBody {
    pub fn name(&self) -> CommandName {
        match self {
            Self::JoinRoom(_) => CommandName::JoinRoom,
            Self::LeaveRoom {} => CommandName::LeaveRoom,
            Self::AddStory { .. } => CommandName::AddStory,
            Self::ChangeStory { .. } => CommandName::ChangeStory,
            Self::TrashStory { .. } => CommandName::TrashStory,
            Self::RestoreStory { .. } => CommandName::RestoreStory,
            Self::DeleteStory { .. } => CommandName::DeleteStory,
            Self::SelectStory { .. } => CommandName::SelectStory,
            Self::GiveStoryEstimate { .. } => CommandName::GiveStoryEstimate,
            Self::ClearStoryEstimate { .. } => CommandName::ClearStoryEstimate,
            Self::NewEstimationRound { .. } => CommandName::NewEstimationRound,
            Self::Reveal { .. } => CommandName::Reveal,
            Self::SetUsername { .. } => CommandName::SetUsername,
            Self::SetEmail { .. } => CommandName::SetEmail,
            Self::SetAvatar { .. } => CommandName::SetAvatar,
            Self::SetCardConfig { .. } => CommandName::SetCardConfig,
            Self::SetPassword { .. } => CommandName::SetPassword,
            Self::ToggleExclude {} => CommandName::ToggleExclude,
            Self::ToggleAutoReveal {} => CommandName::ToggleAutoReveal,
            Self::Kick { .. } => CommandName::Kick,
            Self::ImportStories { .. } => CommandName::ImportStories,
        }
    }
}

/// Client-to-authority request. Sent exactly once per user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub body: CommandBody,
}

impl Command {
    pub fn new(body: CommandBody) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id: None,
            user_id: None,
            body,
        }
    }

    pub fn name(&self) -> CommandName {
        self.body.name()
    }
}

/// Authority-to-client notification of a change that already happened.
///
/// `name` stays a plain string: an authority newer than this client may emit
/// names the client does not know yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub room_id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub payload: Value,
}

/// Canonical transition tag for every event name the authority emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    RoomCreated,
    JoinedRoom,
    LeftRoom,
    ConnectionLost,
    Kicked,
    StoryAdded,
    StoryChanged,
    StoryTrashed,
    StoryRestored,
    StoryDeleted,
    StorySelected,
    StoryEstimateGiven,
    StoryEstimateCleared,
    Revealed,
    NewEstimationRoundStarted,
    ConsensusAchieved,
    UsernameSet,
    EmailSet,
    AvatarSet,
    ExcludedFromEstimations,
    IncludedInEstimations,
    AutoRevealOn,
    AutoRevealOff,
    CardConfigSet,
    PasswordSet,
    PasswordCleared,
    StoriesImported,
    CommandRejected,
}

impl EventType {
    pub const ALL: [EventType; 28] = [
        Self::RoomCreated,
        Self::JoinedRoom,
        Self::LeftRoom,
        Self::ConnectionLost,
        Self::Kicked,
        Self::StoryAdded,
        Self::StoryChanged,
        Self::StoryTrashed,
        Self::StoryRestored,
        Self::StoryDeleted,
        Self::StorySelected,
        Self::StoryEstimateGiven,
        Self::StoryEstimateCleared,
        Self::Revealed,
        Self::NewEstimationRoundStarted,
        Self::ConsensusAchieved,
        Self::UsernameSet,
        Self::EmailSet,
        Self::AvatarSet,
        Self::ExcludedFromEstimations,
        Self::IncludedInEstimations,
        Self::AutoRevealOn,
        Self::AutoRevealOff,
        Self::CardConfigSet,
        Self::PasswordSet,
        Self::PasswordCleared,
        Self::StoriesImported,
        Self::CommandRejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoomCreated => "roomCreated",
            Self::JoinedRoom => "joinedRoom",
            Self::LeftRoom => "leftRoom",
            Self::ConnectionLost => "connectionLost",
            Self::Kicked => "kicked",
            Self::StoryAdded => "storyAdded",
            Self::StoryChanged => "storyChanged",
            Self::StoryTrashed => "storyTrashed",
            Self::StoryRestored => "storyRestored",
            Self::StoryDeleted => "storyDeleted",
            Self::StorySelected => "storySelected",
            Self::StoryEstimateGiven => "storyEstimateGiven",
            Self::StoryEstimateCleared => "storyEstimateCleared",
            Self::Revealed => "revealed",
            Self::NewEstimationRoundStarted => "newEstimationRoundStarted",
            Self::ConsensusAchieved => "consensusAchieved",
            Self::UsernameSet => "usernameSet",
            Self::EmailSet => "emailSet",
            Self::AvatarSet => "avatarSet",
            Self::ExcludedFromEstimations => "excludedFromEstimations",
            Self::IncludedInEstimations => "includedInEstimations",
            Self::AutoRevealOn => "autoRevealOn",
            Self::AutoRevealOff => "autoRevealOff",
            Self::CardConfigSet => "cardConfigSet",
            Self::PasswordSet => "passwordSet",
            Self::PasswordCleared => "passwordCleared",
            Self::StoriesImported => "storiesImported",
            Self::CommandRejected => "commandRejected",
        }
    }

    /// Position in [`EventType::ALL`]. The match is exhaustive, so a new tag
    /// must be given a slot here before it compiles.
    pub const fn index(self) -> usize {
        match self {
            Self::RoomCreated => 0,
            Self::JoinedRoom => 1,
            Self::LeftRoom => 2,
            Self::ConnectionLost => 3,
            Self::Kicked => 4,
            Self::StoryAdded => 5,
            Self::StoryChanged => 6,
            Self::StoryTrashed => 7,
            Self::StoryRestored => 8,
            Self::StoryDeleted => 9,
            Self::StorySelected => 10,
            Self::StoryEstimateGiven => 11,
            Self::StoryEstimateCleared => 12,
            Self::Revealed => 13,
            Self::NewEstimationRoundStarted => 14,
            Self::ConsensusAchieved => 15,
            Self::UsernameSet => 16,
            Self::EmailSet => 17,
            Self::AvatarSet => 18,
            Self::ExcludedFromEstimations => 19,
            Self::IncludedInEstimations => 20,
            Self::AutoRevealOn => 21,
            Self::AutoRevealOff => 22,
            Self::CardConfigSet => 23,
            Self::PasswordSet => 24,
            Self::PasswordCleared => 25,
            Self::StoriesImported => 26,
            Self::CommandRejected => 27,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event_type| event_type.as_str() == name)
    }

    /// Checks that every tag sits at its own slot in the table and has a
    /// unique wire name that resolves back to it.
    pub fn verify_table() -> Result<(), EventTableError> {
        verify_entries(&Self::ALL)
    }
}

const _: () = {
    let mut position = 0;
    while position < EventType::ALL.len() {
        assert!(
            EventType::ALL[position].index() == position,
            "EventType::ALL is out of order"
        );
        position += 1;
    }
};

fn verify_entries(entries: &[EventType]) -> Result<(), EventTableError> {
    for (position, event_type) in entries.iter().enumerate() {
        let name = event_type.as_str();
        if entries[..position].iter().any(|other| other.as_str() == name) {
            return Err(EventTableError::Duplicate(name));
        }
        if event_type.index() != position {
            return Err(EventTableError::Misplaced { name, position });
        }
        if EventType::from_name(name) != Some(*event_type) {
            return Err(EventTableError::Unresolvable(name));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
