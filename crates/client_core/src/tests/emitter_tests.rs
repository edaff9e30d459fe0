use super::*;
use crate::{
    fixtures::RecordingSink,
    selectors::find_next_story_id_to_estimate,
    session::PresetIdentity,
};
use shared::domain::Story;

fn emitter() -> (CommandEmitter, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (
        CommandEmitter::new(sink.clone(), find_next_story_id_to_estimate),
        sink,
    )
}

fn in_room() -> SessionSnapshot {
    SessionSnapshot {
        room_id: Some(RoomId::canonical("abc123")),
        user_id: Some(UserId::from("u1")),
        ..SessionSnapshot::default()
    }
}

fn story(id: &str, created_at: i64) -> Story {
    Story {
        id: StoryId::from(id),
        title: id.to_string(),
        description: String::new(),
        created_at,
        trashed: false,
        revealed: false,
        consensus: None,
    }
}

#[test]
fn join_lower_cases_room_id() {
    let (emitter, sink) = emitter();
    for raw in ["ABC123", "MiXeD-Room", "already-lower", "ÄÖÜ"] {
        let command = emitter.join(&SessionSnapshot::default(), Some(raw), None);
        assert_eq!(
            command.room_id.as_ref().map(RoomId::as_str),
            Some(raw.to_lowercase().as_str())
        );
    }
    assert_eq!(sink.commands().len(), 4);
}

#[test]
fn join_without_room_generates_one() {
    let (emitter, _) = emitter();
    let first = emitter.join(&SessionSnapshot::default(), None, None);
    let second = emitter.join(&SessionSnapshot::default(), None, None);
    let first_room = first.room_id.expect("generated room");
    assert!(!first_room.as_str().is_empty());
    assert_eq!(first_room.as_str(), first_room.as_str().to_lowercase());
    assert_ne!(Some(first_room), second.room_id);
}

#[test]
fn join_carries_presets_and_preset_user_id() {
    let (emitter, _) = emitter();
    let state = SessionSnapshot::with_preset(PresetIdentity {
        user_id: Some(UserId::from("preset-user")),
        username: Some("jim".into()),
        email: Some("jim@example.com".into()),
        avatar: Some(3),
    });
    let command = emitter.join(&state, Some("room"), None);
    assert_eq!(command.user_id, Some(UserId::from("preset-user")));
    let CommandBody::JoinRoom(payload) = command.body else {
        panic!("expected joinRoom");
    };
    assert_eq!(payload.username.as_deref(), Some("jim"));
    assert_eq!(payload.email.as_deref(), Some("jim@example.com"));
    assert_eq!(payload.avatar, Some(3));
}

#[test]
fn join_without_presets_has_no_user_id() {
    let (emitter, _) = emitter();
    let command = emitter.join(&SessionSnapshot::default(), Some("room"), None);
    assert_eq!(command.user_id, None);
    assert_eq!(command.body, CommandBody::JoinRoom(JoinRoomPayload::default()));
}

#[test]
fn password_takes_precedence_over_token() {
    let (emitter, _) = emitter();
    let state = SessionSnapshot {
        user_token: Some("jwt".into()),
        ..SessionSnapshot::default()
    };

    let with_password = emitter.join(&state, Some("room"), Some("secret"));
    let CommandBody::JoinRoom(payload) = with_password.body else {
        panic!("expected joinRoom");
    };
    assert_eq!(payload.password.as_deref(), Some("secret"));
    assert_eq!(payload.token, None);

    let with_token = emitter.join(&state, Some("room"), None);
    let CommandBody::JoinRoom(payload) = with_token.body else {
        panic!("expected joinRoom");
    };
    assert_eq!(payload.password, None);
    assert_eq!(payload.token.as_deref(), Some("jwt"));
}

#[test]
fn estimate_toggles_to_clear_when_value_repeats() {
    let (emitter, sink) = emitter();
    let story_id = StoryId::from("S1");
    let mut state = in_room();

    let first = emitter.give_story_estimate(&state, story_id.clone(), 5.0);
    assert_eq!(first.name().as_str(), "giveStoryEstimate");

    // the authority confirms the estimate before the second click
    state
        .estimations
        .entry(story_id.clone())
        .or_default()
        .insert(UserId::from("u1"), 5.0);

    let second = emitter.give_story_estimate(&state, story_id.clone(), 5.0);
    assert_eq!(
        second.body,
        CommandBody::ClearStoryEstimate {
            story_id: story_id.clone()
        }
    );
    let encoded = serde_json::to_value(&second).expect("encode");
    assert_eq!(encoded["payload"], serde_json::json!({"storyId": "S1"}));

    let different = emitter.give_story_estimate(&state, story_id, 8.0);
    assert_eq!(different.name().as_str(), "giveStoryEstimate");
    assert_eq!(
        sink.names(),
        vec!["giveStoryEstimate", "clearStoryEstimate", "giveStoryEstimate"]
    );
}

#[test]
fn estimate_of_other_user_does_not_toggle() {
    let (emitter, _) = emitter();
    let mut state = in_room();
    state
        .estimations
        .entry(StoryId::from("S1"))
        .or_default()
        .insert(UserId::from("u2"), 5.0);
    let command = emitter.give_story_estimate(&state, StoryId::from("S1"), 5.0);
    assert_eq!(command.name().as_str(), "giveStoryEstimate");
}

#[test]
fn selecting_current_story_sends_nothing() {
    let (emitter, sink) = emitter();
    let state = SessionSnapshot {
        selected_story: Some(StoryId::from("s1")),
        ..in_room()
    };
    assert!(emitter.select_story(&state, StoryId::from("s1")).is_none());
    assert!(emitter.select_story(&state, StoryId::from("s2")).is_some());
    assert_eq!(sink.names(), vec!["selectStory"]);
}

#[test]
fn select_next_story_only_emits_when_one_exists() {
    let (emitter, sink) = emitter();
    let mut state = in_room();
    assert!(emitter.select_next_story(&state).is_none());

    state.stories.insert(StoryId::from("s1"), story("s1", 1));
    state.stories.insert(StoryId::from("s2"), story("s2", 2));
    state.selected_story = Some(StoryId::from("s1"));
    let command = emitter.select_next_story(&state).expect("next story");
    assert_eq!(
        command.body,
        CommandBody::SelectStory {
            story_id: StoryId::from("s2")
        }
    );
    assert_eq!(sink.commands().len(), 1);
}

#[test]
fn room_commands_carry_current_room_and_user() {
    let (emitter, _) = emitter();
    let command = emitter.reveal(&in_room(), StoryId::from("s1"));
    assert_eq!(command.room_id, Some(RoomId::canonical("abc123")));
    assert_eq!(command.user_id, Some(UserId::from("u1")));
}

#[test]
fn packages_arguments_verbatim() {
    let (emitter, _) = emitter();
    let state = in_room();
    assert_eq!(
        emitter.add_story(&state, "Title", "Desc").body,
        CommandBody::AddStory {
            title: "Title".into(),
            description: "Desc".into()
        }
    );
    assert_eq!(
        emitter.kick(&state, UserId::from("u2")).body,
        CommandBody::Kick {
            user_id: UserId::from("u2")
        }
    );
    assert_eq!(
        emitter.toggle_excluded(&state).name().as_str(),
        "toggleExclude"
    );
    assert_eq!(
        emitter.import_stories(&state, "a,b".into()).body,
        CommandBody::ImportStories { data: "a,b".into() }
    );
}

#[test]
fn every_call_sends_a_fresh_command_id() {
    let (emitter, sink) = emitter();
    let state = in_room();
    emitter.toggle_auto_reveal(&state);
    emitter.toggle_auto_reveal(&state);
    let commands = sink.commands();
    assert_ne!(commands[0].id, commands[1].id);
}
