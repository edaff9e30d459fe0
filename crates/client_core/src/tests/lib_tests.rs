use super::*;
use crate::{
    fixtures::{
        event, room_with_story, snapshot, RecordingAddressBar, RecordingSink, ScriptedRoomService,
        StaticFileReader,
    },
    selectors::find_next_story_id_to_estimate,
    settings::MemorySettings,
};
use serde_json::json;
use shared::{
    domain::{RoomId, RoomSnapshot, StoryId, UserId},
    protocol::CommandBody,
};
use tokio::sync::broadcast::error::TryRecvError;

struct Harness {
    engine: SyncEngine,
    completions: mpsc::UnboundedReceiver<CompletionResult>,
    sink: Arc<RecordingSink>,
    address_bar: Arc<RecordingAddressBar>,
    rooms: Arc<ScriptedRoomService>,
    settings: Arc<MemorySettings>,
}

impl Harness {
    fn new(file_content: Option<&str>) -> Self {
        let sink = Arc::new(RecordingSink::default());
        let address_bar = Arc::new(RecordingAddressBar::default());
        let rooms = Arc::new(ScriptedRoomService::default());
        let settings = Arc::new(MemorySettings::default());
        let deps = EngineDependencies {
            commands: sink.clone(),
            address_bar: address_bar.clone(),
            rooms: rooms.clone(),
            files: Arc::new(StaticFileReader {
                content: file_content.map(str::to_string),
            }),
            settings: settings.clone(),
            next_story: find_next_story_id_to_estimate,
        };
        let preset = PresetIdentity {
            user_id: Some(UserId::from("u1")),
            username: Some("jim".into()),
            ..PresetIdentity::default()
        };
        let (engine, completions) = SyncEngine::new(deps, preset).expect("engine");
        Self {
            engine,
            completions,
            sink,
            address_bar,
            rooms,
            settings,
        }
    }

    /// Engine that has already joined room `abc123` as `u1`.
    fn joined() -> Self {
        let mut harness = Self::new(None);
        harness.engine.location_changed("/abc123");
        let mut payload = room_with_story("s1", json!({}));
        payload["userToken"] = json!("tok");
        harness
            .engine
            .dispatch_event(event("joinedRoom", "abc123", Some("u1"), payload));
        harness
    }

    async fn settle(&mut self) -> Result<()> {
        let completion = self.completions.recv().await.expect("completion");
        self.engine.handle_completion(completion)
    }

    fn reject(&mut self, command_name: &str) {
        self.engine.dispatch_event(event(
            "commandRejected",
            "abc123",
            Some("u1"),
            json!({"command": {"name": command_name}, "reason": "not allowed"}),
        ));
    }
}

#[tokio::test]
async fn join_estimate_and_observe_round_trip() {
    let mut harness = Harness::joined();

    assert_eq!(harness.sink.names(), vec!["joinRoom"]);
    let join = &harness.sink.commands()[0];
    assert_eq!(join.room_id, Some(RoomId::canonical("abc123")));
    assert_eq!(harness.engine.pathname(), Some("/abc123"));
    assert_eq!(harness.address_bar.paths(), vec!["/abc123".to_string()]);

    let session = harness.engine.session();
    assert_eq!(session.room_id, Some(RoomId::canonical("abc123")));
    assert_eq!(session.user_token.as_deref(), Some("tok"));
    assert!(session.stories.contains_key(&StoryId::from("s1")));

    harness.engine.give_story_estimate(StoryId::from("s1"), 5.0);
    assert_eq!(harness.sink.names().last(), Some(&"giveStoryEstimate"));

    harness.engine.dispatch_event(event(
        "storyEstimateGiven",
        "abc123",
        Some("u1"),
        json!({"storyId": "s1", "value": 5}),
    ));
    assert_eq!(
        harness
            .engine
            .session()
            .estimate_of(&StoryId::from("s1"), &UserId::from("u1")),
        Some(5.0)
    );
    assert_eq!(harness.engine.action_log().len(), 2);
}

#[tokio::test]
async fn unknown_event_produces_no_notification() {
    let mut harness = Harness::joined();
    let before = harness.engine.session().clone();
    let mut session_rx = harness.engine.subscribe_session();
    let mut events = harness.engine.subscribe_events();

    harness
        .engine
        .dispatch_event(event("somethingNew", "abc123", Some("u1"), json!({})));

    assert!(!session_rx.has_changed().expect("sender alive"));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(harness.engine.session(), &before);
}

#[tokio::test]
async fn rejected_reveal_triggers_one_refetch() {
    let mut harness = Harness::joined();
    harness.reject("reveal");
    assert!(harness.engine.view().unseen_error);

    harness.settle().await.expect("refetch applied");
    assert_eq!(harness.rooms.call_count(), 1);
    let calls = harness.rooms.calls.lock().expect("calls lock").clone();
    assert_eq!(calls[0], ("abc123".to_string(), Some("tok".to_string())));
}

#[tokio::test]
async fn rejected_set_username_does_not_refetch() {
    let mut harness = Harness::joined();
    harness.reject("setUsername");
    tokio::task::yield_now().await;

    assert_eq!(harness.rooms.call_count(), 0);
    assert!(harness.completions.try_recv().is_err());
    assert!(harness.engine.view().unseen_error);
}

#[tokio::test]
async fn older_refetch_cannot_overwrite_newer_one() {
    let mut harness = Harness::joined();
    let first = harness.rooms.gate_next();
    let second = harness.rooms.gate_next();
    harness.reject("reveal");
    harness.reject("giveStoryEstimate");

    second
        .send(snapshot(&["u1", "fresh"]))
        .expect("second gate");
    harness.settle().await.expect("fresh applied");
    assert!(harness
        .engine
        .session()
        .users
        .contains_key(&UserId::from("fresh")));

    let mut session_rx = harness.engine.subscribe_session();
    first.send(snapshot(&["u1", "stale"])).expect("first gate");
    harness.settle().await.expect("stale discarded");

    let users = &harness.engine.session().users;
    assert!(users.contains_key(&UserId::from("fresh")));
    assert!(!users.contains_key(&UserId::from("stale")));
    assert!(!session_rx.has_changed().expect("sender alive"));
}

fn stale_room() -> RoomSnapshot {
    RoomSnapshot {
        auto_reveal: true,
        ..snapshot(&["u1", "zz"])
    }
}

#[tokio::test]
async fn refetch_resolving_after_own_leave_is_discarded() {
    let mut harness = Harness::joined();
    let gate = harness.rooms.gate_next();
    harness.reject("reveal");
    harness
        .engine
        .dispatch_event(event("leftRoom", "abc123", Some("u1"), json!({})));

    let mut session_rx = harness.engine.subscribe_session();
    gate.send(stale_room()).expect("gate");
    harness.settle().await.expect("stale discarded");

    let session = harness.engine.session();
    assert_eq!(session.room_id, None);
    assert!(session.users.is_empty());
    assert!(!session.auto_reveal);
    assert!(!session_rx.has_changed().expect("sender alive"));
}

#[tokio::test]
async fn refetch_resolving_after_own_kick_is_discarded() {
    let mut harness = Harness::joined();
    let gate = harness.rooms.gate_next();
    harness.reject("giveStoryEstimate");
    harness.engine.dispatch_event(event(
        "kicked",
        "abc123",
        Some("u2"),
        json!({"userId": "u1"}),
    ));

    gate.send(stale_room()).expect("gate");
    harness.settle().await.expect("stale discarded");

    let session = harness.engine.session();
    assert_eq!(session.room_id, None);
    assert!(session.users.is_empty());
}

#[tokio::test]
async fn refetch_for_previous_room_does_not_leak_into_new_room() {
    let mut harness = Harness::joined();
    let gate = harness.rooms.gate_next();
    harness.reject("reveal");
    harness.engine.dispatch_event(event(
        "joinedRoom",
        "other",
        Some("u1"),
        json!({"users": [{"id": "u1", "username": "jim"}]}),
    ));

    gate.send(stale_room()).expect("gate");
    harness.settle().await.expect("stale discarded");

    let session = harness.engine.session();
    assert_eq!(session.room_id, Some(RoomId::canonical("other")));
    assert!(!session.users.contains_key(&UserId::from("zz")));
    assert!(!session.auto_reveal);
}

#[tokio::test]
async fn failed_refetch_is_surfaced() {
    let mut harness = Harness::joined();
    let gate = harness.rooms.gate_next();
    let mut events = harness.engine.subscribe_events();
    harness.reject("kick");
    drop(gate);

    let err = harness.settle().await.expect_err("gate dropped");
    assert!(matches!(err, SyncError::Authority { status: 503, .. }));
    let mut saw_fault = false;
    while let Ok(event) = events.try_recv() {
        saw_fault |= matches!(event, ClientEvent::Fault(_));
    }
    assert!(saw_fault);
}

#[tokio::test]
async fn commands_stay_pending_until_correlated_event() {
    let mut harness = Harness::joined();
    harness.engine.add_story("Second", "");
    assert!(harness.engine.has_matching_pending_command(CommandName::AddStory));

    let added = harness.sink.commands().last().cloned().expect("addStory");
    let mut reply = event(
        "storyAdded",
        "abc123",
        Some("u1"),
        json!({"id": "s2", "title": "Second", "createdAt": 2}),
    );
    reply.correlation_id = Some(added.id.to_string());
    harness.engine.dispatch_event(reply);

    assert!(!harness.engine.has_matching_pending_command(CommandName::AddStory));
    assert!(harness
        .engine
        .session()
        .stories
        .contains_key(&StoryId::from("s2")));
}

#[tokio::test]
async fn leaving_goes_through_the_address_bar() {
    let mut harness = Harness::joined();
    harness.engine.leave_room();
    assert_eq!(harness.address_bar.paths().last().map(String::as_str), Some("/"));
    assert_eq!(harness.sink.names(), vec!["joinRoom"]);

    harness.engine.location_changed("/");
    assert_eq!(harness.sink.names(), vec!["joinRoom", "leaveRoom"]);

    harness
        .engine
        .dispatch_event(event("leftRoom", "abc123", Some("u1"), json!({})));
    let session = harness.engine.session();
    assert_eq!(session.room_id, None);
    assert_eq!(session.preset.username.as_deref(), Some("jim"));
    assert!(harness.engine.action_log().is_empty());
}

#[tokio::test]
async fn reconnect_rejoins_known_room() {
    let mut harness = Harness::joined();
    harness.engine.socket_reconnected();
    let commands = harness.sink.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[1].room_id, Some(RoomId::canonical("abc123")));
    assert!(matches!(commands[1].body, CommandBody::JoinRoom(_)));

    let mut fresh = Harness::new(None);
    fresh.engine.socket_reconnected();
    assert!(fresh.sink.commands().is_empty());
}

#[tokio::test]
async fn dropped_file_becomes_import_command() {
    let mut harness = Harness::new(Some("title\nFirst story"));
    harness.engine.location_changed("/abc123");
    harness.engine.import_file(PathBuf::from("stories.csv"));
    harness.settle().await.expect("file read");

    let last = harness.sink.commands().last().cloned().expect("import");
    match last.body {
        CommandBody::ImportStories { data } => assert_eq!(data, "title\nFirst story"),
        other => panic!("unexpected command {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_file_sends_nothing() {
    let mut harness = Harness::new(None);
    harness.engine.import_file(PathBuf::from("missing.csv"));
    let err = harness.settle().await.expect_err("read fails");
    assert!(matches!(err, SyncError::FileRead { .. }));
    assert!(harness.sink.commands().is_empty());
}

#[tokio::test]
async fn status_fetch_is_stored() {
    let mut harness = Harness::new(None);
    *harness.rooms.status.lock().expect("status lock") = Some(AppStatus {
        version: "1.0.0".into(),
        total_rooms: 3,
        ..AppStatus::default()
    });
    harness.engine.fetch_status();
    harness.settle().await.expect("status");
    assert_eq!(
        harness.engine.app_status().map(|status| status.total_rooms),
        Some(3)
    );
}

#[tokio::test]
async fn ui_intents_update_view_and_settings() {
    let mut harness = Harness::new(None);

    harness.engine.toggle_sidebar(Sidebar::Help);
    assert_eq!(harness.engine.view().sidebar, Some(Sidebar::Help));
    harness.engine.toggle_sidebar(Sidebar::Help);
    assert_eq!(harness.engine.view().sidebar, None);

    harness.engine.toggle_sidebar(Sidebar::Settings);
    harness.engine.toggle_backlog();
    assert!(harness.engine.view().backlog_shown);
    assert_eq!(harness.engine.view().sidebar, None);

    let old = harness.engine.view().translator.clone();
    harness.engine.set_language(Language::De);
    assert!(!old.same_instance(&harness.engine.view().translator));
    assert_eq!(harness.settings.preset_language(), Some(Language::De));

    harness.engine.hide_new_user_hints();
    assert!(harness.settings.hide_new_user_hints());
    assert!(harness.engine.view().new_user_hint_hidden);
}
