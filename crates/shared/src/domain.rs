use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(StoryId);

/// Room identifier in canonical (lower-case) form.
///
/// Every constructor lower-cases its input, including deserialization, so a
/// `RoomId` held anywhere in the client is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn canonical(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    /// Fresh random room id, used when joining without naming a room.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self::canonical(&value)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self::canonical(value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric card value. Cards like "½" or "?" still carry a number.
pub type EstimateValue = f64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<u32>,
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub disconnected: bool,
}

impl User {
    pub fn bare(id: UserId) -> Self {
        Self {
            id,
            username: None,
            email: None,
            avatar: None,
            excluded: false,
            disconnected: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Milliseconds since the unix epoch.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub trashed: bool,
    #[serde(default)]
    pub revealed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<EstimateValue>,
}

/// A story as delivered inside a full room snapshot, estimates included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySnapshot {
    #[serde(flatten)]
    pub story: Story,
    #[serde(default)]
    pub estimations: HashMap<UserId, EstimateValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfigItem {
    pub label: String,
    pub value: EstimateValue,
    #[serde(default)]
    pub color: String,
}

/// Authoritative room state, as returned by the room endpoint and embedded in
/// the local identity's `joinedRoom` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub stories: Vec<StorySnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_story: Option<StoryId>,
    #[serde(default)]
    pub card_config: Vec<CardConfigItem>,
    #[serde(default)]
    pub auto_reveal: bool,
    #[serde(default)]
    pub password_protected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatus {
    #[serde(default)]
    pub user_count: u32,
    #[serde(default)]
    pub user_count_disconnected: u32,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub last_activity: i64,
}

/// Service health information shown on the status page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    #[serde(default)]
    pub version: String,
    /// Seconds since the authority started.
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub total_rooms: u64,
    #[serde(default)]
    pub rooms: Vec<RoomStatus>,
}
