use super::*;
use crate::events::Transition;
use serde_json::json;

#[test]
fn event_table_names_are_unique_and_resolvable() {
    assert_eq!(EventType::verify_table(), Ok(()));
    assert_eq!(EventType::from_name("joinedRoom"), Some(EventType::JoinedRoom));
    assert_eq!(EventType::from_name("someFutureEvent"), None);
}

#[test]
fn every_tag_sits_at_its_own_slot() {
    for (position, event_type) in EventType::ALL.into_iter().enumerate() {
        assert_eq!(event_type.index(), position, "{}", event_type.as_str());
    }
}

#[test]
fn table_check_reports_misplaced_and_duplicate_entries() {
    assert_eq!(
        verify_entries(&[EventType::JoinedRoom, EventType::RoomCreated]),
        Err(EventTableError::Misplaced { name: "joinedRoom", position: 0 })
    );
    assert_eq!(
        verify_entries(&[EventType::RoomCreated, EventType::RoomCreated]),
        Err(EventTableError::Duplicate("roomCreated"))
    );
    assert_eq!(verify_entries(&EventType::ALL[..3]), Ok(()));
}

#[test]
fn event_type_serde_names_match_table() {
    for event_type in EventType::ALL {
        let encoded = serde_json::to_value(event_type).expect("encode tag");
        assert_eq!(encoded, json!(event_type.as_str()));
    }
}

#[test]
fn command_serializes_name_and_payload_at_top_level() {
    let mut command = Command::new(CommandBody::GiveStoryEstimate {
        story_id: StoryId::from("s1"),
        value: 5.0,
    });
    command.room_id = Some(RoomId::canonical("ABC"));

    let encoded = serde_json::to_value(&command).expect("encode command");
    assert_eq!(encoded["name"], json!("giveStoryEstimate"));
    assert_eq!(encoded["roomId"], json!("abc"));
    assert_eq!(encoded["payload"], json!({"storyId": "s1", "value": 5.0}));
    assert!(encoded.get("userId").is_none());
    assert_eq!(command.name().as_str(), "giveStoryEstimate");
}

#[test]
fn field_less_commands_carry_empty_payload_object() {
    let encoded = serde_json::to_value(Command::new(CommandBody::LeaveRoom {})).expect("encode");
    assert_eq!(encoded["name"], json!("leaveRoom"));
    assert_eq!(encoded["payload"], json!({}));

    let encoded = serde_json::to_value(Command::new(CommandBody::ToggleExclude {})).expect("encode");
    assert_eq!(encoded["name"], json!("toggleExclude"));
}

#[test]
fn join_payload_omits_absent_fields() {
    let encoded = serde_json::to_value(Command::new(CommandBody::JoinRoom(JoinRoomPayload {
        username: Some("jim".into()),
        ..Default::default()
    })))
    .expect("encode");
    assert_eq!(encoded["payload"], json!({"username": "jim"}));
}

#[test]
fn room_id_is_lower_cased_when_deserialized() {
    let event: Event = serde_json::from_value(json!({
        "name": "joinedRoom",
        "roomId": "MyRoom",
        "userId": "u1",
        "correlationId": "c-1",
        "payload": {}
    }))
    .expect("decode event");
    assert_eq!(event.room_id.as_str(), "myroom");
    assert_eq!(event.correlation_id.as_deref(), Some("c-1"));
}

#[test]
fn missing_payload_decodes_as_defaults() {
    let event: Event = serde_json::from_value(json!({"name": "joinedRoom", "roomId": "r"}))
        .expect("decode event");
    let transition = Transition::decode(EventType::JoinedRoom, &event.payload).expect("decode");
    assert_eq!(transition.event_type(), EventType::JoinedRoom);
}

#[test]
fn decodes_joined_room_snapshot_with_estimations() {
    let payload = json!({
        "users": [{"id": "u1", "username": "jim"}],
        "stories": [{"id": "s1", "title": "First", "createdAt": 10, "estimations": {"u1": 3}}],
        "selectedStory": "s1",
        "userToken": "jwt"
    });
    let Transition::JoinedRoom(joined) =
        Transition::decode(EventType::JoinedRoom, &payload).expect("decode")
    else {
        panic!("expected joinedRoom transition");
    };
    assert_eq!(joined.user_token.as_deref(), Some("jwt"));
    assert_eq!(joined.room.users[0].username.as_deref(), Some("jim"));
    assert_eq!(joined.room.stories[0].estimations.get(&UserId::from("u1")), Some(&3.0));
    assert_eq!(joined.room.selected_story, Some(StoryId::from("s1")));
}

#[test]
fn malformed_payload_is_a_decode_error() {
    let result = Transition::decode(EventType::StoryEstimateGiven, &json!({"storyId": "s1"}));
    assert!(result.is_err());
}

#[test]
fn command_rejected_without_command_still_decodes() {
    let transition =
        Transition::decode(EventType::CommandRejected, &json!({"reason": "nope"})).expect("decode");
    assert_eq!(
        transition,
        Transition::CommandRejected(crate::events::CommandRejectedPayload {
            command: None,
            reason: "nope".into(),
        })
    );
}
