//! Human-readable history of room events, shown in the action-log panel.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use shared::{domain::UserId, events::Transition, protocol::EventType};

use crate::{action::TransitionNotice, session::SessionSnapshot, translator::Translator};

pub const ACTION_LOG_CAPACITY: usize = 250;

#[derive(Debug, Clone, PartialEq)]
pub struct ActionLogEntry {
    pub at: DateTime<Utc>,
    pub event: EventType,
    pub user_id: Option<UserId>,
    pub message: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
}

impl ActionLog {
    /// `session` is the snapshot before the notice was applied, so names of
    /// leaving users can still be resolved.
    pub fn record(
        &mut self,
        notice: &TransitionNotice,
        session: &SessionSnapshot,
        translator: &Translator,
        at: DateTime<Utc>,
    ) {
        let user_id = notice.event.user_id.clone();
        let username = user_id
            .as_ref()
            .and_then(|id| session.users.get(id))
            .and_then(|user| user.username.clone())
            .or_else(|| user_id.as_ref().map(|id| id.to_string()))
            .unwrap_or_default();
        let key = notice.event_type().as_str();

        let message = match &notice.transition {
            Transition::CommandRejected(rejected) => {
                translator.t_with(key, &[("reason", rejected.reason.as_str())])
            }
            Transition::ConsensusAchieved(consensus) => {
                translator.t_with(key, &[("value", consensus.value.to_string().as_str())])
            }
            _ => translator.t_with(key, &[("username", username.as_str())]),
        };

        if self.entries.len() == ACTION_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(ActionLogEntry {
            at,
            event: notice.event_type(),
            user_id,
            message,
            is_error: matches!(notice.transition, Transition::CommandRejected(_)),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/action_log_tests.rs"]
mod tests;
