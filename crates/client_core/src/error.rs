use shared::error::EventTableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch room {room_id}: {source}")]
    RoomFetch {
        room_id: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch app status: {0}")]
    StatusFetch(#[source] reqwest::Error),
    #[error("failed to read dropped file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("client settings at {path}: {message}")]
    Settings { path: String, message: String },
    #[error("invalid server url {0}: must start with http:// or https://")]
    InvalidServerUrl(String),
    #[error("authority responded with {status}: {message}")]
    Authority { status: u16, message: String },
    #[error("event table is inconsistent: {0}")]
    EventTable(#[from] EventTableError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
