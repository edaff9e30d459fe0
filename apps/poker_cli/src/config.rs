use std::{collections::HashMap, fs, path::Path, path::PathBuf};

use anyhow::anyhow;
use client_core::session::PresetIdentity;
use shared::domain::UserId;

pub const CONFIG_FILE: &str = "poker.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub settings_path: Option<PathBuf>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<u32>,
    pub user_id: Option<String>,
    pub reconnect_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            settings_path: None,
            username: None,
            email: None,
            avatar: None,
            user_id: None,
            reconnect_delay_ms: 2000,
        }
    }
}

impl Settings {
    pub fn preset(&self) -> PresetIdentity {
        PresetIdentity {
            user_id: self.user_id.as_deref().map(UserId::from),
            username: self.username.clone(),
            email: self.email.clone(),
            avatar: self.avatar,
        }
    }

    fn apply_file(&mut self, raw: &str) {
        let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
            tracing::warn!("ignoring {CONFIG_FILE}: expected flat string keys");
            return;
        };
        if let Some(v) = file_cfg.get("server_url") {
            self.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("settings_path") {
            self.settings_path = Some(PathBuf::from(v));
        }
        if let Some(v) = file_cfg.get("username") {
            self.username = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("email") {
            self.email = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("avatar") {
            if let Ok(parsed) = v.parse::<u32>() {
                self.avatar = Some(parsed);
            }
        }
        if let Some(v) = file_cfg.get("user_id") {
            self.user_id = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("reconnect_delay_ms") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.reconnect_delay_ms = parsed;
            }
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("POKER_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = var("APP__SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = var("APP__SETTINGS_PATH") {
            self.settings_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("APP__USERNAME") {
            self.username = Some(v);
        }
        if let Some(v) = var("APP__EMAIL") {
            self.email = Some(v);
        }
        if let Some(v) = var("APP__AVATAR") {
            if let Ok(parsed) = v.parse::<u32>() {
                self.avatar = Some(parsed);
            }
        }
        if let Some(v) = var("APP__USER_ID") {
            self.user_id = Some(v);
        }
        if let Some(v) = var("APP__RECONNECT_DELAY_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.reconnect_delay_ms = parsed;
            }
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

fn load_settings_from(path: &Path, var: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        settings.apply_file(&raw);
    }
    settings.apply_env(var);
    settings
}

pub fn default_client_settings_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow!("unable to resolve user config dir"))?;
    Ok(base.join("poker").join("settings.json"))
}

pub fn websocket_url(server_url: &str) -> anyhow::Result<String> {
    let base = if server_url.starts_with("https://") {
        server_url.replacen("https://", "wss://", 1)
    } else if server_url.starts_with("http://") {
        server_url.replacen("http://", "ws://", 1)
    } else {
        return Err(anyhow!("server_url must start with http:// or https://"));
    };
    Ok(format!("{}/ws", base.trim_end_matches('/')))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
