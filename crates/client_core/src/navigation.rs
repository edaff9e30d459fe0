//! Keeps the address bar and room membership in step.

use std::sync::Arc;

use shared::domain::RoomId;
use tracing::debug;

use crate::{action::MembershipIntent, session::SessionSnapshot, AddressBar};

/// Path segment of the status page; never treated as a room id.
pub const APP_STATUS_IDENTIFIER: &str = "appStatus";

pub fn room_id_in_pathname(pathname: &str) -> Option<&str> {
    let candidate = pathname.strip_prefix('/')?.trim_end_matches('/');
    if candidate.is_empty() || candidate == APP_STATUS_IDENTIFIER {
        return None;
    }
    Some(candidate)
}

fn is_root(pathname: &str) -> bool {
    pathname.len() < 2
}

pub struct NavigationBridge {
    address_bar: Arc<dyn AddressBar>,
}

impl NavigationBridge {
    pub fn new(address_bar: Arc<dyn AddressBar>) -> Self {
        Self { address_bar }
    }

    /// Membership change implied by a new location, if any.
    pub fn on_location_changed(
        &self,
        pathname: &str,
        session: &SessionSnapshot,
    ) -> Option<MembershipIntent> {
        if let Some(room_id) = room_id_in_pathname(pathname) {
            if session.room_id.is_none() {
                return Some(MembershipIntent::Join {
                    room_id: Some(RoomId::canonical(room_id)),
                    password: None,
                });
            }
        } else if is_root(pathname) && session.user_id.is_some() && session.room_id.is_some() {
            return Some(MembershipIntent::Leave);
        }
        None
    }

    /// Rejoining is the only reconnect recovery: the authority answers with
    /// the full room state.
    pub fn on_socket_reconnected(&self, session: &SessionSnapshot) -> Option<MembershipIntent> {
        session.room_id.as_ref().map(|room_id| MembershipIntent::Join {
            room_id: Some(room_id.clone()),
            password: None,
        })
    }

    /// Bridge side of a membership intent. Leaving only moves the address
    /// bar; the location change then produces the `leaveRoom` command.
    pub fn apply_intent(&self, intent: &MembershipIntent) {
        if let MembershipIntent::Leave = intent {
            self.navigate("/");
        }
    }

    pub fn navigate(&self, path: &str) {
        debug!(path, "pushing address bar location");
        self.address_bar.push(path);
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
