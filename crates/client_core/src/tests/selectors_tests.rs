use super::*;
use shared::domain::UserId;

fn story(id: &str, created_at: i64) -> Story {
    Story {
        id: StoryId::from(id),
        title: id.to_uppercase(),
        description: String::new(),
        created_at,
        trashed: false,
        revealed: false,
        consensus: None,
    }
}

fn state_with(stories: Vec<Story>, selected: Option<&str>) -> SessionSnapshot {
    SessionSnapshot {
        stories: stories.into_iter().map(|s| (s.id.clone(), s)).collect(),
        selected_story: selected.map(StoryId::from),
        ..SessionSnapshot::default()
    }
}

#[test]
fn next_story_skips_selected_revealed_and_trashed() {
    let mut revealed = story("b", 2);
    revealed.revealed = true;
    let mut trashed = story("c", 3);
    trashed.trashed = true;
    let state = state_with(
        vec![story("a", 1), revealed, trashed, story("d", 4)],
        Some("a"),
    );
    assert_eq!(find_next_story_id_to_estimate(&state), Some(StoryId::from("d")));
}

#[test]
fn next_story_orders_by_creation_time() {
    let state = state_with(vec![story("z", 1), story("a", 9)], None);
    assert_eq!(find_next_story_id_to_estimate(&state), Some(StoryId::from("z")));
}

#[test]
fn no_next_story_when_all_done() {
    let state = state_with(vec![story("a", 1)], Some("a"));
    assert_eq!(find_next_story_id_to_estimate(&state), None);
}

#[test]
fn splits_active_and_trashed() {
    let mut trashed = story("t", 1);
    trashed.trashed = true;
    let state = state_with(vec![story("a", 2), trashed], None);
    assert_eq!(active_stories(&state).len(), 1);
    assert_eq!(trashed_stories(&state)[0].id, StoryId::from("t"));
}

#[test]
fn own_estimate_reads_local_identity() {
    let mut state = state_with(vec![story("a", 1)], Some("a"));
    state.user_id = Some(UserId::from("u1"));
    state
        .estimations
        .entry(StoryId::from("a"))
        .or_default()
        .insert(UserId::from("u1"), 8.0);
    assert_eq!(own_estimate(&state, &StoryId::from("a")), Some(8.0));
    assert_eq!(selected_story(&state).map(|s| s.title.as_str()), Some("A"));
}
