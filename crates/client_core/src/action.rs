//! Notifications consumed by the state stores.

use shared::{
    domain::{AppStatus, RoomId, RoomSnapshot, StoryId, UserId},
    events::Transition,
    protocol::{Event, EventType},
};

use crate::{translator::Language, view::Sidebar};

/// The typed half of a dispatched event: the raw envelope plus its decoded
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionNotice {
    pub event: Event,
    pub transition: Transition,
    /// Set for `joinedRoom` when the join belongs to the local identity.
    pub our_join: bool,
}

impl TransitionNotice {
    pub fn event_type(&self) -> EventType {
        self.transition.event_type()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiIntent {
    ToggleSidebar(Sidebar),
    ToggleBacklog,
    SetLanguage(Language),
    HideNewUserHints,
    ShowTrash,
    HideTrash,
    HighlightStory(StoryId),
    EditStory(StoryId),
    CancelEditStory(StoryId),
    ToggleMarkForKick(UserId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Generic diagnostics notification, emitted for every known event.
    EventObserved {
        event_name: String,
        correlation_id: Option<String>,
    },
    Transition(Box<TransitionNotice>),
    RoomStateFetched {
        generation: u64,
        room_id: RoomId,
        room: RoomSnapshot,
    },
    StatusFetched(AppStatus),
    LocationChanged {
        pathname: String,
    },
    Ui(UiIntent),
}

impl Action {
    pub fn transition(&self) -> Option<&TransitionNotice> {
        match self {
            Self::Transition(notice) => Some(notice),
            _ => None,
        }
    }
}

/// Local membership intent, consumed by both the navigation bridge (which
/// moves the address bar) and the emitter (which sends the command).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipIntent {
    Join {
        room_id: Option<RoomId>,
        password: Option<String>,
    },
    Leave,
}
