//! UI-only view state. Driven by the same notifications as the session but
//! carries no protocol meaning.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{StoryId, UserId},
    events::Transition,
};

use crate::{
    action::{Action, UiIntent},
    settings::ClientSettingsStore,
    translator::{Language, Translator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sidebar {
    Help,
    Settings,
    #[serde(rename = "ACTIONLOG")]
    ActionLog,
}

impl Sidebar {
    pub fn key(self) -> &'static str {
        match self {
            Self::Help => "HELP",
            Self::Settings => "SETTINGS",
            Self::ActionLog => "ACTIONLOG",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "HELP" => Some(Self::Help),
            "SETTINGS" => Some(Self::Settings),
            "ACTIONLOG" => Some(Self::ActionLog),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    /// Only meaningful on narrow screens where the backlog is collapsible.
    pub backlog_shown: bool,
    pub sidebar: Option<Sidebar>,
    pub applause: bool,
    pub unseen_error: bool,
    pub new_user_hint_hidden: bool,
    pub language: Language,
    pub translator: Translator,
    pub trash_shown: bool,
    pub highlighted_story: Option<StoryId>,
    pub editing_stories: BTreeSet<StoryId>,
    pub marked_for_kick: Option<UserId>,
}

impl ViewState {
    /// Defaults, with persisted preferences read from the settings port.
    pub fn initial(settings: &dyn ClientSettingsStore) -> Self {
        let language = settings.preset_language().unwrap_or_default();
        Self {
            backlog_shown: false,
            sidebar: None,
            applause: false,
            unseen_error: false,
            new_user_hint_hidden: settings.hide_new_user_hints(),
            language,
            translator: Translator::new(language),
            trash_shown: false,
            highlighted_story: None,
            editing_stories: BTreeSet::new(),
            marked_for_kick: None,
        }
    }
}

// Translators compare by language; use `Translator::same_instance` to detect
// a replacement.
impl PartialEq for ViewState {
    fn eq(&self, other: &Self) -> bool {
        self.backlog_shown == other.backlog_shown
            && self.sidebar == other.sidebar
            && self.applause == other.applause
            && self.unseen_error == other.unseen_error
            && self.new_user_hint_hidden == other.new_user_hint_hidden
            && self.language == other.language
            && self.translator.language() == other.translator.language()
            && self.trash_shown == other.trash_shown
            && self.highlighted_story == other.highlighted_story
            && self.editing_stories == other.editing_stories
            && self.marked_for_kick == other.marked_for_kick
    }
}

/// `own_user_id` must be the local identity as known *before* the
/// notification was applied to the session.
pub fn reduce(
    state: &ViewState,
    action: &Action,
    own_user_id: Option<&UserId>,
    settings: &dyn ClientSettingsStore,
) -> ViewState {
    match action {
        Action::Transition(notice) => match &notice.transition {
            Transition::JoinedRoom(_) if notice.our_join => ViewState {
                unseen_error: false,
                ..state.clone()
            },
            Transition::LeftRoom
                if own_user_id.is_some() && notice.event.user_id.as_ref() == own_user_id =>
            {
                ViewState::initial(settings)
            }
            Transition::StorySelected(_) | Transition::NewEstimationRoundStarted(_) => ViewState {
                applause: false,
                ..state.clone()
            },
            Transition::ConsensusAchieved(_) => ViewState {
                applause: true,
                ..state.clone()
            },
            Transition::CommandRejected(_) => ViewState {
                unseen_error: true,
                ..state.clone()
            },
            _ => state.clone(),
        },
        Action::Ui(intent) => reduce_intent(state, intent, settings),
        Action::EventObserved { .. }
        | Action::RoomStateFetched { .. }
        | Action::StatusFetched(_)
        | Action::LocationChanged { .. } => state.clone(),
    }
}

fn reduce_intent(
    state: &ViewState,
    intent: &UiIntent,
    settings: &dyn ClientSettingsStore,
) -> ViewState {
    let mut next = state.clone();
    match intent {
        UiIntent::ToggleSidebar(key) => {
            if state.sidebar == Some(*key) {
                next.sidebar = None;
            } else {
                next.sidebar = Some(*key);
                next.backlog_shown = false;
                if *key == Sidebar::ActionLog {
                    next.unseen_error = false;
                }
            }
        }
        UiIntent::ToggleBacklog => {
            next.backlog_shown = !state.backlog_shown;
            if next.backlog_shown {
                next.sidebar = None;
            }
        }
        UiIntent::SetLanguage(language) => {
            settings.set_preset_language(*language);
            next.language = *language;
            next.translator = Translator::new(*language);
        }
        UiIntent::HideNewUserHints => {
            settings.set_hide_new_user_hints(true);
            next.new_user_hint_hidden = true;
        }
        UiIntent::ShowTrash => next.trash_shown = true,
        UiIntent::HideTrash => next.trash_shown = false,
        UiIntent::HighlightStory(story_id) => next.highlighted_story = Some(story_id.clone()),
        UiIntent::EditStory(story_id) => {
            next.editing_stories.insert(story_id.clone());
        }
        UiIntent::CancelEditStory(story_id) => {
            next.editing_stories.remove(story_id);
        }
        UiIntent::ToggleMarkForKick(user_id) => {
            next.marked_for_kick = if state.marked_for_kick.as_ref() == Some(user_id) {
                None
            } else {
                Some(user_id.clone())
            };
        }
    }
    next
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
