//! Client-side command/event synchronization engine for an estimation room.
//!
//! [`SyncEngine`] owns the session and view stores. Every mutation happens
//! synchronously inside one of its `&mut self` methods; asynchronous work
//! (room refetch, status fetch, file reads) runs on spawned tasks whose
//! results come back through the completion channel and are applied by
//! [`SyncEngine::handle_completion`] in arrival order.

use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use shared::{
    domain::{AppStatus, CardConfigItem, EstimateValue, RoomId, StoryId, UserId},
    events::Transition,
    protocol::{Command, CommandName, Event, EventType},
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info};

pub mod action;
pub mod action_log;
pub mod emitter;
pub mod error;
pub mod navigation;
pub mod pending;
pub mod recovery;
pub mod router;
pub mod selectors;
pub mod services;
pub mod session;
pub mod settings;
pub mod time_util;
pub mod translator;
pub mod view;

use action::{Action, MembershipIntent, UiIntent};
use action_log::ActionLog;
use emitter::CommandEmitter;
use error::{Result, SyncError};
use navigation::NavigationBridge;
use pending::PendingCommands;
use recovery::{RecoveryController, ResyncRequest};
use selectors::NextStoryFn;
use services::{FileReader, RoomService};
use session::{PresetIdentity, SessionSnapshot};
use settings::ClientSettingsStore;
use translator::Language;
use view::{Sidebar, ViewState};

/// Transport-send capability. Fire-and-forget.
pub trait CommandSink: Send + Sync {
    fn send_command(&self, command: Command);
}

/// Address bar. Hosts report location changes back through
/// [`SyncEngine::location_changed`].
pub trait AddressBar: Send + Sync {
    fn push(&self, path: &str);
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Applied(Action),
    CommandSent(Command),
    Fault(String),
}

/// Result of a spawned I/O task, fed back into the engine.
#[derive(Debug)]
pub enum Completion {
    Action(Action),
    FileRead(String),
}

pub type CompletionResult = std::result::Result<Completion, SyncError>;

pub struct EngineDependencies {
    pub commands: Arc<dyn CommandSink>,
    pub address_bar: Arc<dyn AddressBar>,
    pub rooms: Arc<dyn RoomService>,
    pub files: Arc<dyn FileReader>,
    pub settings: Arc<dyn ClientSettingsStore>,
    pub next_story: NextStoryFn,
}

pub struct SyncEngine {
    emitter: CommandEmitter,
    navigation: NavigationBridge,
    recovery: RecoveryController,
    rooms: Arc<dyn RoomService>,
    files: Arc<dyn FileReader>,
    settings: Arc<dyn ClientSettingsStore>,
    session: SessionSnapshot,
    view: ViewState,
    pending: PendingCommands,
    action_log: ActionLog,
    app_status: Option<AppStatus>,
    pathname: Option<String>,
    session_tx: watch::Sender<SessionSnapshot>,
    view_tx: watch::Sender<ViewState>,
    events: broadcast::Sender<ClientEvent>,
    completions: mpsc::UnboundedSender<CompletionResult>,
}

impl SyncEngine {
    pub fn new(
        deps: EngineDependencies,
        preset: PresetIdentity,
    ) -> Result<(Self, mpsc::UnboundedReceiver<CompletionResult>)> {
        EventType::verify_table()?;

        let session = SessionSnapshot::with_preset(preset);
        let view = ViewState::initial(deps.settings.as_ref());
        let (session_tx, _) = watch::channel(session.clone());
        let (view_tx, _) = watch::channel(view.clone());
        let (events, _) = broadcast::channel(1024);
        let (completions, completion_rx) = mpsc::unbounded_channel();

        let engine = Self {
            emitter: CommandEmitter::new(deps.commands, deps.next_story),
            navigation: NavigationBridge::new(deps.address_bar),
            recovery: RecoveryController::default(),
            rooms: deps.rooms,
            files: deps.files,
            settings: deps.settings,
            session,
            view,
            pending: PendingCommands::default(),
            action_log: ActionLog::default(),
            app_status: None,
            pathname: None,
            session_tx,
            view_tx,
            events,
            completions,
        };
        Ok((engine, completion_rx))
    }

    pub fn session(&self) -> &SessionSnapshot {
        &self.session
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn pending(&self) -> &PendingCommands {
        &self.pending
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }

    pub fn app_status(&self) -> Option<&AppStatus> {
        self.app_status.as_ref()
    }

    pub fn pathname(&self) -> Option<&str> {
        self.pathname.as_deref()
    }

    pub fn has_matching_pending_command(&self, name: CommandName) -> bool {
        selectors::has_matching_pending_command(&self.pending, name)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<SessionSnapshot> {
        self.session_tx.subscribe()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    /// Applies one notification to both stores and publishes the result.
    pub fn apply(&mut self, action: Action) {
        match &action {
            Action::EventObserved {
                correlation_id: Some(correlation_id),
                ..
            } => {
                self.pending.resolve(correlation_id);
            }
            Action::RoomStateFetched {
                generation,
                room_id,
                ..
            } if !self.recovery.accepts(*generation, room_id, &self.session) => {
                debug!(
                    generation,
                    latest = self.recovery.latest_generation(),
                    room_id = %room_id,
                    current_room = self.session.room_id.as_ref().map(RoomId::as_str),
                    "discarding stale room state"
                );
                return;
            }
            Action::StatusFetched(status) => self.app_status = Some(status.clone()),
            Action::LocationChanged { pathname } => self.pathname = Some(pathname.clone()),
            _ => {}
        }

        // the view reducer needs the identity from before this notification
        let own_user_id = self.session.user_id.clone();
        let mut own_leave = false;
        if let Some(notice) = action.transition() {
            let own = |user_id: Option<&UserId>| {
                own_user_id.is_some() && user_id == own_user_id.as_ref()
            };
            own_leave = matches!(notice.transition, Transition::LeftRoom)
                && own(notice.event.user_id.as_ref());
            let own_kick = matches!(
                &notice.transition,
                Transition::Kicked(kicked) if own(Some(&kicked.user_id))
            );
            if notice.our_join || own_leave || own_kick {
                self.recovery.invalidate();
            }
            self.action_log
                .record(notice, &self.session, &self.view.translator, Utc::now());
        }

        let next_session = session::reduce(&self.session, &action);
        let next_view = view::reduce(
            &self.view,
            &action,
            own_user_id.as_ref(),
            self.settings.as_ref(),
        );
        self.session = next_session;
        self.view = next_view;
        if own_leave {
            self.action_log = ActionLog::default();
        }

        self.session_tx.send_replace(self.session.clone());
        self.view_tx.send_replace(self.view.clone());
        let _ = self.events.send(ClientEvent::Applied(action));
    }

    /// Entry point for every inbound event.
    pub fn dispatch_event(&mut self, event: Event) {
        let Some(routed) = router::route(event, &self.session) else {
            return;
        };

        self.apply(routed.observed);

        let mut rejection = None;
        if let Some(notice) = routed.notice {
            if let Transition::CommandRejected(payload) = &notice.transition {
                rejection = Some(payload.clone());
            }
            self.apply(Action::Transition(Box::new(notice)));
        }

        if let Some(path) = routed.navigate_to {
            self.navigation.navigate(&path);
        }

        if let Some(rejected) = rejection {
            if let Some(request) = self
                .recovery
                .try_to_recover_on_rejection(&rejected, &self.session)
            {
                self.spawn_resync(request);
            }
        }
    }

    /// Applies the outcome of a spawned task. Failures are published as
    /// [`ClientEvent::Fault`] and returned to the caller; nothing is retried.
    pub fn handle_completion(&mut self, completion: CompletionResult) -> Result<()> {
        match completion {
            Ok(Completion::Action(action)) => {
                self.apply(action);
                Ok(())
            }
            Ok(Completion::FileRead(content)) => {
                let command = self.emitter.import_stories(&self.session, content);
                self.track(command);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "async operation failed");
                let _ = self.events.send(ClientEvent::Fault(err.to_string()));
                Err(err)
            }
        }
    }

    fn track(&mut self, command: Command) {
        self.pending.record(&command);
        let _ = self.events.send(ClientEvent::CommandSent(command));
    }

    fn track_optional(&mut self, command: Option<Command>) {
        if let Some(command) = command {
            self.track(command);
        }
    }

    fn spawn_resync(&self, request: ResyncRequest) {
        let rooms = Arc::clone(&self.rooms);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = recovery::fetch_room_state(rooms.as_ref(), request)
                .await
                .map(Completion::Action);
            let _ = completions.send(result);
        });
    }

    // membership and navigation

    pub fn join_room(&mut self, room_id: Option<&str>, password: Option<&str>) {
        let command = self.emitter.join(&self.session, room_id, password);
        self.track(command);
    }

    /// Only moves the address bar; the resulting location change sends the
    /// `leaveRoom` command.
    pub fn leave_room(&mut self) {
        self.navigation.apply_intent(&MembershipIntent::Leave);
    }

    pub fn location_changed(&mut self, pathname: &str) {
        if let Some(intent) = self.navigation.on_location_changed(pathname, &self.session) {
            let command = self.emitter.apply_intent(&self.session, &intent);
            self.track(command);
        }
        self.apply(Action::LocationChanged {
            pathname: pathname.to_string(),
        });
    }

    pub fn socket_reconnected(&mut self) {
        if let Some(intent) = self.navigation.on_socket_reconnected(&self.session) {
            info!("socket reconnected; rejoining room");
            let command = self.emitter.apply_intent(&self.session, &intent);
            self.track(command);
        }
    }

    // room commands

    pub fn add_story(&mut self, title: &str, description: &str) {
        let command = self.emitter.add_story(&self.session, title, description);
        self.track(command);
    }

    pub fn change_story(&mut self, story_id: StoryId, title: &str, description: &str) {
        let command = self
            .emitter
            .change_story(&self.session, story_id, title, description);
        self.track(command);
    }

    pub fn trash_story(&mut self, story_id: StoryId) {
        let command = self.emitter.trash_story(&self.session, story_id);
        self.track(command);
    }

    pub fn restore_story(&mut self, story_id: StoryId) {
        let command = self.emitter.restore_story(&self.session, story_id);
        self.track(command);
    }

    pub fn delete_story(&mut self, story_id: StoryId) {
        let command = self.emitter.delete_story(&self.session, story_id);
        self.track(command);
    }

    pub fn select_story(&mut self, story_id: StoryId) {
        let command = self.emitter.select_story(&self.session, story_id);
        self.track_optional(command);
    }

    pub fn select_next_story(&mut self) {
        let command = self.emitter.select_next_story(&self.session);
        self.track_optional(command);
    }

    pub fn give_story_estimate(&mut self, story_id: StoryId, value: EstimateValue) {
        let command = self
            .emitter
            .give_story_estimate(&self.session, story_id, value);
        self.track(command);
    }

    pub fn new_estimation_round(&mut self, story_id: StoryId) {
        let command = self.emitter.new_estimation_round(&self.session, story_id);
        self.track(command);
    }

    pub fn reveal(&mut self, story_id: StoryId) {
        let command = self.emitter.reveal(&self.session, story_id);
        self.track(command);
    }

    pub fn set_username(&mut self, username: &str) {
        let command = self.emitter.set_username(&self.session, username);
        self.track(command);
    }

    pub fn set_email(&mut self, email: &str) {
        let command = self.emitter.set_email(&self.session, email);
        self.track(command);
    }

    pub fn set_avatar(&mut self, avatar: u32) {
        let command = self.emitter.set_avatar(&self.session, avatar);
        self.track(command);
    }

    pub fn set_card_config(&mut self, card_config: Vec<CardConfigItem>) {
        let command = self.emitter.set_card_config(&self.session, card_config);
        self.track(command);
    }

    pub fn set_password(&mut self, password: &str) {
        let command = self.emitter.set_password(&self.session, password);
        self.track(command);
    }

    pub fn toggle_excluded(&mut self) {
        let command = self.emitter.toggle_excluded(&self.session);
        self.track(command);
    }

    pub fn toggle_auto_reveal(&mut self) {
        let command = self.emitter.toggle_auto_reveal(&self.session);
        self.track(command);
    }

    pub fn kick(&mut self, user_id: UserId) {
        let command = self.emitter.kick(&self.session, user_id);
        self.track(command);
    }

    /// Reads the file on a spawned task; `importStories` is sent once the
    /// content arrives through [`Self::handle_completion`].
    pub fn import_file(&self, path: PathBuf) {
        let files = Arc::clone(&self.files);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = files
                .read_dropped_file(&path)
                .await
                .map(Completion::FileRead);
            let _ = completions.send(result);
        });
    }

    pub fn fetch_status(&self) {
        let rooms = Arc::clone(&self.rooms);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = rooms
                .get_app_status()
                .await
                .map(|status| Completion::Action(Action::StatusFetched(status)));
            let _ = completions.send(result);
        });
    }

    // ui-only intents

    pub fn toggle_sidebar(&mut self, sidebar: Sidebar) {
        self.apply(Action::Ui(UiIntent::ToggleSidebar(sidebar)));
    }

    pub fn toggle_backlog(&mut self) {
        self.apply(Action::Ui(UiIntent::ToggleBacklog));
    }

    pub fn set_language(&mut self, language: Language) {
        self.apply(Action::Ui(UiIntent::SetLanguage(language)));
    }

    pub fn hide_new_user_hints(&mut self) {
        self.apply(Action::Ui(UiIntent::HideNewUserHints));
    }

    pub fn show_trash(&mut self) {
        self.apply(Action::Ui(UiIntent::ShowTrash));
    }

    pub fn hide_trash(&mut self) {
        self.apply(Action::Ui(UiIntent::HideTrash));
    }

    pub fn highlight_story(&mut self, story_id: StoryId) {
        self.apply(Action::Ui(UiIntent::HighlightStory(story_id)));
    }

    pub fn edit_story(&mut self, story_id: StoryId) {
        self.apply(Action::Ui(UiIntent::EditStory(story_id)));
    }

    pub fn cancel_edit_story(&mut self, story_id: StoryId) {
        self.apply(Action::Ui(UiIntent::CancelEditStory(story_id)));
    }

    pub fn toggle_mark_for_kick(&mut self, user_id: UserId) {
        self.apply(Action::Ui(UiIntent::ToggleMarkForKick(user_id)));
    }
}

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
