//! Resynchronization after rejected estimation commands.

use shared::{domain::RoomId, events::CommandRejectedPayload, protocol::CommandName};
use tracing::{debug, info};

use crate::{action::Action, error::Result, services::RoomService, session::SessionSnapshot};

/// Command families whose rejection means the local estimation state has
/// probably drifted from the authority.
pub const RESYNC_ON_REJECTION: [CommandName; 5] = [
    CommandName::GiveStoryEstimate,
    CommandName::ClearStoryEstimate,
    CommandName::NewEstimationRound,
    CommandName::Reveal,
    CommandName::Kick,
];

pub fn requires_resync(command_name: &str) -> bool {
    RESYNC_ON_REJECTION
        .iter()
        .any(|name| name.as_str() == command_name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncRequest {
    pub generation: u64,
    pub room_id: RoomId,
    pub user_token: Option<String>,
}

/// Hands out a generation per resync; only the newest generation's response
/// may be applied.
#[derive(Debug, Default)]
pub struct RecoveryController {
    latest_generation: u64,
}

impl RecoveryController {
    pub fn try_to_recover_on_rejection(
        &mut self,
        rejected: &CommandRejectedPayload,
        session: &SessionSnapshot,
    ) -> Option<ResyncRequest> {
        let command = rejected.command.as_ref()?;
        if !requires_resync(&command.name) {
            debug!(command = %command.name, "rejection needs no resync");
            return None;
        }
        let room_id = session.room_id.clone()?;

        self.latest_generation += 1;
        info!(
            command = %command.name,
            room_id = %room_id,
            generation = self.latest_generation,
            "command rejected; refetching room state"
        );
        Some(ResyncRequest {
            generation: self.latest_generation,
            room_id,
            user_token: session.user_token.clone(),
        })
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest_generation
    }

    /// A fetched room may replace the session only if it answers the newest
    /// request and the session is still in that room.
    pub fn accepts(&self, generation: u64, room_id: &RoomId, session: &SessionSnapshot) -> bool {
        self.is_current(generation) && session.room_id.as_ref() == Some(room_id)
    }

    /// Makes every in-flight resync stale. Called when the local identity
    /// joins, leaves or is kicked.
    pub fn invalidate(&mut self) {
        self.latest_generation += 1;
        debug!(
            generation = self.latest_generation,
            "membership changed; pending resyncs invalidated"
        );
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation
    }
}

pub async fn fetch_room_state(rooms: &dyn RoomService, request: ResyncRequest) -> Result<Action> {
    let room = rooms
        .get_room(&request.room_id, request.user_token.as_deref())
        .await?;
    Ok(Action::RoomStateFetched {
        generation: request.generation,
        room_id: request.room_id,
        room,
    })
}

#[cfg(test)]
#[path = "tests/recovery_tests.rs"]
mod tests;
