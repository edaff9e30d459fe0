//! Maps inbound events to notifications.

use shared::{
    events::Transition,
    protocol::{Event, EventType},
};
use tracing::{error, warn};

use crate::{
    action::{Action, TransitionNotice},
    session::SessionSnapshot,
};

/// Everything one inbound event fans out into.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEvent {
    pub event_type: EventType,
    /// Always `Action::EventObserved`.
    pub observed: Action,
    /// `None` when the payload does not match its tag.
    pub notice: Option<TransitionNotice>,
    /// Address-bar target, set for a decodable `joinedRoom`.
    pub navigate_to: Option<String>,
}

impl RoutedEvent {
    pub fn is_rejection(&self) -> bool {
        self.event_type == EventType::CommandRejected
    }
}

/// Resolves `event` against the event table. Unknown names are logged and
/// yield `None`: no notification is produced for them.
pub fn route(event: Event, session: &SessionSnapshot) -> Option<RoutedEvent> {
    let Some(event_type) = EventType::from_name(&event.name) else {
        error!(
            event = %event.name,
            "unknown incoming event type; no specific notification dispatched"
        );
        return None;
    };

    let observed = Action::EventObserved {
        event_name: event.name.clone(),
        correlation_id: event.correlation_id.clone(),
    };
    let notice = match Transition::decode(event_type, &event.payload) {
        Ok(transition) => {
            let our_join = event_type == EventType::JoinedRoom
                && (session.room_id.is_none() || session.is_own(event.user_id.as_ref()));
            Some(TransitionNotice {
                event,
                transition,
                our_join,
            })
        }
        Err(err) => {
            warn!(
                event = %event.name,
                correlation_id = event.correlation_id.as_deref(),
                error = %err,
                "malformed event payload; state left unchanged"
            );
            None
        }
    };

    let navigate_to = notice
        .as_ref()
        .filter(|notice| notice.event_type() == EventType::JoinedRoom)
        .map(|notice| format!("/{}", notice.event.room_id));

    Some(RoutedEvent {
        event_type,
        observed,
        notice,
        navigate_to,
    })
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
