//! Builds commands from user intent and hands them to the transport.
//!
//! The emitter never retries: a command is sent exactly once per call.

use std::sync::Arc;

use shared::{
    domain::{CardConfigItem, EstimateValue, RoomId, StoryId, UserId},
    protocol::{Command, CommandBody, JoinRoomPayload},
};
use tracing::debug;

use crate::{
    action::MembershipIntent, selectors::NextStoryFn, session::SessionSnapshot, CommandSink,
};

pub struct CommandEmitter {
    sink: Arc<dyn CommandSink>,
    next_story: NextStoryFn,
}

impl CommandEmitter {
    pub fn new(sink: Arc<dyn CommandSink>, next_story: NextStoryFn) -> Self {
        Self { sink, next_story }
    }

    fn emit(&self, command: Command) -> Command {
        debug!(
            command = command.name().as_str(),
            command_id = %command.id,
            room_id = command.room_id.as_ref().map(RoomId::as_str),
            "sending command"
        );
        self.sink.send_command(command.clone());
        command
    }

    /// Stamps the current room and identity onto a room-scoped command.
    fn emit_in_room(&self, state: &SessionSnapshot, body: CommandBody) -> Command {
        let mut command = Command::new(body);
        command.room_id = state.room_id.clone();
        command.user_id = state.user_id.clone();
        self.emit(command)
    }

    pub fn join(
        &self,
        state: &SessionSnapshot,
        room_id: Option<&str>,
        password: Option<&str>,
    ) -> Command {
        let room_id = room_id
            .filter(|raw| !raw.is_empty())
            .map(RoomId::canonical)
            .unwrap_or_else(RoomId::generate);

        let password = password.filter(|p| !p.is_empty()).map(str::to_string);
        let token = if password.is_some() {
            None
        } else {
            state.user_token.clone()
        };
        let payload = JoinRoomPayload {
            username: state.preset.username.clone(),
            email: state.preset.email.clone(),
            avatar: state.preset.avatar,
            password,
            token,
        };

        let mut command = Command::new(CommandBody::JoinRoom(payload));
        command.room_id = Some(room_id);
        command.user_id = state.preset.user_id.clone();
        self.emit(command)
    }

    pub fn leave_room(&self, state: &SessionSnapshot) -> Command {
        self.emit_in_room(state, CommandBody::LeaveRoom {})
    }

    /// Emitter side of a membership intent.
    pub fn apply_intent(&self, state: &SessionSnapshot, intent: &MembershipIntent) -> Command {
        match intent {
            MembershipIntent::Join { room_id, password } => self.join(
                state,
                room_id.as_ref().map(RoomId::as_str),
                password.as_deref(),
            ),
            MembershipIntent::Leave => self.leave_room(state),
        }
    }

    pub fn add_story(&self, state: &SessionSnapshot, title: &str, description: &str) -> Command {
        self.emit_in_room(
            state,
            CommandBody::AddStory {
                title: title.to_string(),
                description: description.to_string(),
            },
        )
    }

    pub fn change_story(
        &self,
        state: &SessionSnapshot,
        story_id: StoryId,
        title: &str,
        description: &str,
    ) -> Command {
        self.emit_in_room(
            state,
            CommandBody::ChangeStory {
                story_id,
                title: title.to_string(),
                description: description.to_string(),
            },
        )
    }

    pub fn trash_story(&self, state: &SessionSnapshot, story_id: StoryId) -> Command {
        self.emit_in_room(state, CommandBody::TrashStory { story_id })
    }

    pub fn restore_story(&self, state: &SessionSnapshot, story_id: StoryId) -> Command {
        self.emit_in_room(state, CommandBody::RestoreStory { story_id })
    }

    pub fn delete_story(&self, state: &SessionSnapshot, story_id: StoryId) -> Command {
        self.emit_in_room(state, CommandBody::DeleteStory { story_id })
    }

    /// No-op when the story is already selected.
    pub fn select_story(&self, state: &SessionSnapshot, story_id: StoryId) -> Option<Command> {
        if state.selected_story.as_ref() == Some(&story_id) {
            return None;
        }
        Some(self.emit_in_room(state, CommandBody::SelectStory { story_id }))
    }

    pub fn select_next_story(&self, state: &SessionSnapshot) -> Option<Command> {
        let story_id = (self.next_story)(state)?;
        Some(self.emit_in_room(state, CommandBody::SelectStory { story_id }))
    }

    /// Giving the value already recorded for the local user retracts it.
    pub fn give_story_estimate(
        &self,
        state: &SessionSnapshot,
        story_id: StoryId,
        value: EstimateValue,
    ) -> Command {
        let current = state
            .user_id
            .as_ref()
            .and_then(|user_id| state.estimate_of(&story_id, user_id));
        let body = if current == Some(value) {
            CommandBody::ClearStoryEstimate { story_id }
        } else {
            CommandBody::GiveStoryEstimate { story_id, value }
        };
        self.emit_in_room(state, body)
    }

    pub fn new_estimation_round(&self, state: &SessionSnapshot, story_id: StoryId) -> Command {
        self.emit_in_room(state, CommandBody::NewEstimationRound { story_id })
    }

    pub fn reveal(&self, state: &SessionSnapshot, story_id: StoryId) -> Command {
        self.emit_in_room(state, CommandBody::Reveal { story_id })
    }

    pub fn set_username(&self, state: &SessionSnapshot, username: &str) -> Command {
        self.emit_in_room(
            state,
            CommandBody::SetUsername {
                username: username.to_string(),
            },
        )
    }

    pub fn set_email(&self, state: &SessionSnapshot, email: &str) -> Command {
        self.emit_in_room(
            state,
            CommandBody::SetEmail {
                email: email.to_string(),
            },
        )
    }

    pub fn set_avatar(&self, state: &SessionSnapshot, avatar: u32) -> Command {
        self.emit_in_room(state, CommandBody::SetAvatar { avatar })
    }

    pub fn set_card_config(
        &self,
        state: &SessionSnapshot,
        card_config: Vec<CardConfigItem>,
    ) -> Command {
        self.emit_in_room(state, CommandBody::SetCardConfig { card_config })
    }

    pub fn set_password(&self, state: &SessionSnapshot, password: &str) -> Command {
        self.emit_in_room(
            state,
            CommandBody::SetPassword {
                password: password.to_string(),
            },
        )
    }

    pub fn toggle_excluded(&self, state: &SessionSnapshot) -> Command {
        self.emit_in_room(state, CommandBody::ToggleExclude {})
    }

    pub fn toggle_auto_reveal(&self, state: &SessionSnapshot) -> Command {
        self.emit_in_room(state, CommandBody::ToggleAutoReveal {})
    }

    pub fn kick(&self, state: &SessionSnapshot, user_id: UserId) -> Command {
        self.emit_in_room(state, CommandBody::Kick { user_id })
    }

    pub fn import_stories(&self, state: &SessionSnapshot, data: String) -> Command {
        self.emit_in_room(state, CommandBody::ImportStories { data })
    }
}

#[cfg(test)]
#[path = "tests/emitter_tests.rs"]
mod tests;
