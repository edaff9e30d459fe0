//! Read-only derivations over the session snapshot and app state.

use shared::{
    domain::{EstimateValue, Story, StoryId, User},
    protocol::CommandName,
};

use crate::{pending::PendingCommands, session::SessionSnapshot};

/// Signature of the "which story comes next" strategy used by the emitter.
pub type NextStoryFn = fn(&SessionSnapshot) -> Option<StoryId>;

/// Active (non-trashed) stories, oldest first.
pub fn active_stories(state: &SessionSnapshot) -> Vec<&Story> {
    let mut stories: Vec<&Story> = state.stories.values().filter(|s| !s.trashed).collect();
    stories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    stories
}

pub fn trashed_stories(state: &SessionSnapshot) -> Vec<&Story> {
    let mut stories: Vec<&Story> = state.stories.values().filter(|s| s.trashed).collect();
    stories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    stories
}

/// First active story, other than the selected one, that has not been
/// revealed yet.
pub fn find_next_story_id_to_estimate(state: &SessionSnapshot) -> Option<StoryId> {
    active_stories(state)
        .into_iter()
        .filter(|story| !story.revealed && story.consensus.is_none())
        .find(|story| state.selected_story.as_ref() != Some(&story.id))
        .map(|story| story.id.clone())
}

pub fn selected_story(state: &SessionSnapshot) -> Option<&Story> {
    state
        .selected_story
        .as_ref()
        .and_then(|story_id| state.stories.get(story_id))
}

pub fn own_user(state: &SessionSnapshot) -> Option<&User> {
    state.user_id.as_ref().and_then(|id| state.users.get(id))
}

pub fn own_estimate(state: &SessionSnapshot, story_id: &StoryId) -> Option<EstimateValue> {
    state
        .user_id
        .as_ref()
        .and_then(|user_id| state.estimate_of(story_id, user_id))
}

pub fn has_matching_pending_command(pending: &PendingCommands, name: CommandName) -> bool {
    pending.contains_name(name)
}

#[cfg(test)]
#[path = "tests/selectors_tests.rs"]
mod tests;
