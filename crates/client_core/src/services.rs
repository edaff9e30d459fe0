//! I/O collaborators: room-state fetch, app status and dropped-file reading.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{AppStatus, RoomId, RoomSnapshot},
    error::ApiError,
};
use url::Url;

use crate::error::{Result, SyncError};

#[async_trait]
pub trait RoomService: Send + Sync {
    async fn get_room(&self, room_id: &RoomId, user_token: Option<&str>) -> Result<RoomSnapshot>;
    async fn get_app_status(&self) -> Result<AppStatus>;
}

#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read_dropped_file(&self, path: &Path) -> Result<String>;
}

pub struct FsFileReader;

#[async_trait]
impl FileReader for FsFileReader {
    async fn read_dropped_file(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SyncError::FileRead {
                path: path.display().to_string(),
                source,
            })
    }
}

/// REST client for the authority's `/api` endpoints.
pub struct HttpRoomService {
    http: Client,
    base_url: Url,
}

impl HttpRoomService {
    pub fn new(server_url: &str) -> Result<Self> {
        if !(server_url.starts_with("http://") || server_url.starts_with("https://")) {
            return Err(SyncError::InvalidServerUrl(server_url.to_string()));
        }
        let base_url = Url::parse(server_url.trim_end_matches('/'))
            .map_err(|_| SyncError::InvalidServerUrl(server_url.to_string()))?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidServerUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn authority_error(response: Response) -> SyncError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|err| err.message)
        .unwrap_or(body);
    SyncError::Authority { status, message }
}

#[async_trait]
impl RoomService for HttpRoomService {
    async fn get_room(&self, room_id: &RoomId, user_token: Option<&str>) -> Result<RoomSnapshot> {
        let to_fetch_error = |source| SyncError::RoomFetch {
            room_id: room_id.to_string(),
            source,
        };
        let mut request = self
            .http
            .get(self.endpoint(&["api", "room", room_id.as_str()])?);
        if let Some(token) = user_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(to_fetch_error)?;
        if !response.status().is_success() {
            return Err(authority_error(response).await);
        }
        response.json().await.map_err(to_fetch_error)
    }

    async fn get_app_status(&self) -> Result<AppStatus> {
        let response = self
            .http
            .get(self.endpoint(&["api", "status"])?)
            .send()
            .await
            .map_err(SyncError::StatusFetch)?;
        if !response.status().is_success() {
            return Err(authority_error(response).await);
        }
        response.json().await.map_err(SyncError::StatusFetch)
    }
}

#[cfg(test)]
#[path = "tests/services_tests.rs"]
mod tests;
