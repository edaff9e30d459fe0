//! Session snapshot and its pure reducer.

use std::collections::{BTreeMap, HashMap};

use shared::{
    domain::{CardConfigItem, EstimateValue, RoomId, RoomSnapshot, Story, StoryId, User, UserId},
    events::Transition,
};
use tracing::warn;

use crate::action::{Action, TransitionNotice};

/// Identity defaults supplied by the client, sent once with `joinRoom`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetIdentity {
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<u32>,
}

impl PresetIdentity {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub room_id: Option<RoomId>,
    pub user_id: Option<UserId>,
    pub user_token: Option<String>,
    pub preset: PresetIdentity,
    pub selected_story: Option<StoryId>,
    /// story -> user -> value; at most one value per user per story.
    pub estimations: HashMap<StoryId, HashMap<UserId, EstimateValue>>,
    pub users: BTreeMap<UserId, User>,
    pub stories: BTreeMap<StoryId, Story>,
    pub card_config: Vec<CardConfigItem>,
    pub auto_reveal: bool,
    pub password_protected: bool,
}

impl SessionSnapshot {
    pub fn with_preset(preset: PresetIdentity) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    pub fn is_own(&self, user_id: Option<&UserId>) -> bool {
        user_id.is_some() && user_id == self.user_id.as_ref()
    }

    pub fn estimate_of(&self, story_id: &StoryId, user_id: &UserId) -> Option<EstimateValue> {
        self.estimations
            .get(story_id)
            .and_then(|by_user| by_user.get(user_id))
            .copied()
    }

    /// Empty snapshot that keeps only the client-supplied presets.
    fn emptied(&self) -> Self {
        Self::with_preset(self.preset.clone())
    }

    /// Replaces the room slice wholesale, leaving identity untouched.
    fn replace_room(&mut self, room: &RoomSnapshot) {
        self.users = room
            .users
            .iter()
            .map(|user| (user.id.clone(), user.clone()))
            .collect();
        self.stories = BTreeMap::new();
        self.estimations = HashMap::new();
        for snapshot in &room.stories {
            let story_id = snapshot.story.id.clone();
            if !snapshot.estimations.is_empty() {
                self.estimations
                    .insert(story_id.clone(), snapshot.estimations.clone());
            }
            self.stories.insert(story_id, snapshot.story.clone());
        }
        self.selected_story = room.selected_story.clone();
        self.card_config = room.card_config.clone();
        self.auto_reveal = room.auto_reveal;
        self.password_protected = room.password_protected;
    }

    fn user_mut(&mut self, user_id: &UserId) -> &mut User {
        self.users
            .entry(user_id.clone())
            .or_insert_with(|| User::bare(user_id.clone()))
    }

    fn story_mut(&mut self, story_id: &StoryId) -> Option<&mut Story> {
        let story = self.stories.get_mut(story_id);
        if story.is_none() {
            warn!(story_id = %story_id, "event refers to unknown story");
        }
        story
    }
}

/// Applies one notification. The input snapshot is never modified.
pub fn reduce(state: &SessionSnapshot, action: &Action) -> SessionSnapshot {
    match action {
        Action::Transition(notice) => apply_transition(state, notice),
        Action::RoomStateFetched { room, .. } => {
            let mut next = state.clone();
            next.replace_room(room);
            next
        }
        Action::EventObserved { .. }
        | Action::StatusFetched(_)
        | Action::LocationChanged { .. }
        | Action::Ui(_) => state.clone(),
    }
}

fn apply_transition(state: &SessionSnapshot, notice: &TransitionNotice) -> SessionSnapshot {
    let event = &notice.event;
    let actor = event.user_id.as_ref();
    let mut next = state.clone();

    match &notice.transition {
        Transition::JoinedRoom(joined) => {
            if notice.our_join {
                let same_room = state.room_id.as_ref() == Some(&event.room_id);
                next = state.emptied();
                next.room_id = Some(event.room_id.clone());
                next.user_id = actor.cloned().or_else(|| state.user_id.clone());
                next.user_token = joined
                    .user_token
                    .clone()
                    .or_else(|| same_room.then(|| state.user_token.clone()).flatten());
                next.replace_room(&joined.room);
            } else if let Some(user_id) = actor {
                let joined_user = joined
                    .room
                    .users
                    .iter()
                    .find(|user| &user.id == user_id)
                    .cloned()
                    .unwrap_or_else(|| User::bare(user_id.clone()));
                next.users.insert(user_id.clone(), joined_user);
            }
        }
        Transition::LeftRoom => {
            if state.is_own(actor) {
                next = state.emptied();
            } else if let Some(user_id) = actor {
                next.users.remove(user_id);
            }
        }
        Transition::Kicked(kicked) => {
            if state.is_own(Some(&kicked.user_id)) {
                next = state.emptied();
            } else {
                next.users.remove(&kicked.user_id);
            }
        }
        Transition::ConnectionLost => {
            if let Some(user_id) = actor {
                next.user_mut(user_id).disconnected = true;
            }
        }
        Transition::StoryAdded(story) => {
            next.stories.insert(story.id.clone(), story.clone());
        }
        Transition::StoryChanged(changed) => {
            if let Some(story) = next.story_mut(&changed.story_id) {
                story.title = changed.title.clone();
                story.description = changed.description.clone();
            }
        }
        Transition::StoryTrashed(target) => {
            if let Some(story) = next.story_mut(&target.story_id) {
                story.trashed = true;
            }
        }
        Transition::StoryRestored(target) => {
            if let Some(story) = next.story_mut(&target.story_id) {
                story.trashed = false;
            }
        }
        Transition::StoryDeleted(target) => {
            next.stories.remove(&target.story_id);
            next.estimations.remove(&target.story_id);
        }
        Transition::StorySelected(selected) => {
            next.selected_story = selected.story_id.clone();
        }
        Transition::StoryEstimateGiven(given) => match actor {
            Some(user_id) => {
                next.estimations
                    .entry(given.story_id.clone())
                    .or_default()
                    .insert(user_id.clone(), given.value);
            }
            None => warn!(event = %event.name, "estimate event without user id"),
        },
        Transition::StoryEstimateCleared(target) => {
            if let Some(user_id) = actor {
                let now_empty = match next.estimations.get_mut(&target.story_id) {
                    Some(by_user) => {
                        by_user.remove(user_id);
                        by_user.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    next.estimations.remove(&target.story_id);
                }
            }
        }
        Transition::Revealed(target) => {
            if let Some(story) = next.story_mut(&target.story_id) {
                story.revealed = true;
            }
        }
        Transition::NewEstimationRoundStarted(target) => {
            next.estimations.remove(&target.story_id);
            if let Some(story) = next.story_mut(&target.story_id) {
                story.revealed = false;
                story.consensus = None;
            }
        }
        Transition::ConsensusAchieved(consensus) => {
            if let Some(story) = next.story_mut(&consensus.story_id) {
                story.consensus = Some(consensus.value);
            }
        }
        Transition::UsernameSet(set) => {
            if let Some(user_id) = actor {
                next.user_mut(user_id).username = Some(set.username.clone());
                if state.is_own(actor) {
                    next.preset.username = Some(set.username.clone());
                }
            }
        }
        Transition::EmailSet(set) => {
            if let Some(user_id) = actor {
                next.user_mut(user_id).email = Some(set.email.clone());
                if state.is_own(actor) {
                    next.preset.email = Some(set.email.clone());
                }
            }
        }
        Transition::AvatarSet(set) => {
            if let Some(user_id) = actor {
                next.user_mut(user_id).avatar = Some(set.avatar);
                if state.is_own(actor) {
                    next.preset.avatar = Some(set.avatar);
                }
            }
        }
        Transition::ExcludedFromEstimations => {
            if let Some(user_id) = actor {
                next.user_mut(user_id).excluded = true;
            }
        }
        Transition::IncludedInEstimations => {
            if let Some(user_id) = actor {
                next.user_mut(user_id).excluded = false;
            }
        }
        Transition::AutoRevealOn => next.auto_reveal = true,
        Transition::AutoRevealOff => next.auto_reveal = false,
        Transition::CardConfigSet(config) => next.card_config = config.card_config.clone(),
        Transition::PasswordSet => next.password_protected = true,
        Transition::PasswordCleared => next.password_protected = false,
        Transition::StoriesImported(imported) => {
            for story in &imported.stories {
                next.stories.insert(story.id.clone(), story.clone());
            }
        }
        Transition::RoomCreated | Transition::CommandRejected(_) => {}
    }

    next
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
