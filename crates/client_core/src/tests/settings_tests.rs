use super::*;
use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_path() -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    env::temp_dir()
        .join(format!("poker_client_settings_{suffix}"))
        .join("settings.json")
}

#[test]
fn missing_file_starts_with_defaults() {
    let settings = JsonFileSettings::open(temp_settings_path()).expect("open settings");
    assert_eq!(settings.preset_language(), None);
    assert!(!settings.hide_new_user_hints());
}

#[test]
fn preferences_survive_reopen() {
    let path = temp_settings_path();
    {
        let settings = JsonFileSettings::open(&path).expect("open settings");
        settings.set_preset_language(Language::De);
        settings.set_hide_new_user_hints(true);
    }

    let reopened = JsonFileSettings::open(&path).expect("reopen settings");
    assert_eq!(reopened.preset_language(), Some(Language::De));
    assert!(reopened.hide_new_user_hints());

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn corrupt_file_is_reported() {
    let path = temp_settings_path();
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "not json").expect("write");

    let err = JsonFileSettings::open(&path).expect_err("corrupt settings");
    assert!(matches!(err, SyncError::Settings { .. }));

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn memory_settings_round_trip() {
    let settings = MemorySettings::default();
    settings.set_preset_language(Language::En);
    assert_eq!(settings.preset_language(), Some(Language::En));
}
