// src/youtube.rs
//! YouTube Data API v3 client implementing the `PlaylistClient` capability.
//!
//! Auth is a bearer access token handed in by the caller; obtaining and
//! refreshing it is outside this crate. Failure classification is centralized
//! in [`classify_api_error`]: HTTP status plus the API's structured
//! `errors[].reason` first, message substrings only as a last resort.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;

use crate::commit::PlaylistClient;
use crate::error::RemoteError;
use crate::types::VideoInfo;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: u32 = 50;

pub struct YouTubeClient {
    client: Client,
    access_token: String,
    playlist_id: String,
    api_base: String,
}

impl YouTubeClient {
    pub fn new(access_token: String, playlist_id: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
            playlist_id,
            api_base: API_BASE.to_string(),
        }
    }

    /// Test hook to point at a local stub server.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<serde_json::Value, RemoteError> {
        let rsp = req
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(RemoteError::other)?;

        let status = rsp.status();
        let body = rsp.text().await.map_err(RemoteError::other)?;
        if !status.is_success() {
            return Err(classify_api_error(status, &body));
        }
        serde_json::from_str(&body).map_err(RemoteError::other)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

/// Map an API failure onto the error taxonomy.
pub fn classify_api_error(status: StatusCode, body: &str) -> RemoteError {
    let parsed: Option<ApiErrorEnvelope> = serde_json::from_str(body).ok();
    let (message, reasons) = match &parsed {
        Some(env) => (
            env.error.message.clone(),
            env.error
                .errors
                .iter()
                .map(|e| e.reason.as_str())
                .collect::<Vec<_>>(),
        ),
        None => (body.trim().to_string(), Vec::new()),
    };

    let has_reason = |r: &str| reasons.iter().any(|x| x.eq_ignore_ascii_case(r));

    if status == StatusCode::CONFLICT
        || has_reason("duplicate")
        || has_reason("videoAlreadyInPlaylist")
    {
        return RemoteError::Conflict;
    }
    if status == StatusCode::NOT_FOUND || has_reason("videoNotFound") || has_reason("notFound") {
        return RemoteError::NotFound;
    }
    if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
        return RemoteError::Permission(message);
    }
    // last resort: some backends only signal duplicates in the message text
    if message.to_ascii_lowercase().contains("duplicate") {
        return RemoteError::Conflict;
    }
    RemoteError::Other(format!("HTTP {status}: {message}"))
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[async_trait]
impl PlaylistClient for YouTubeClient {
    /// Walks the playlist page by page and collects every video id.
    async fn list_identifiers(&self) -> Result<HashSet<String>, RemoteError> {
        let mut ids = HashSet::new();
        let mut page_token: Option<String> = None;
        let page_size = PAGE_SIZE.to_string();

        loop {
            let mut req = self
                .client
                .get(format!("{}/playlistItems", self.api_base))
                .query(&[
                    ("part", "contentDetails"),
                    ("playlistId", self.playlist_id.as_str()),
                    ("maxResults", page_size.as_str()),
                ]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let value = self.send(req).await?;
            let page: PlaylistItemsPage =
                serde_json::from_value(value).map_err(RemoteError::other)?;
            for item in page.items {
                ids.insert(item.content_details.video_id);
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!(count = ids.len(), "fetched current playlist contents");
        Ok(ids)
    }

    async fn lookup(&self, identifier: &str) -> Result<Option<VideoInfo>, RemoteError> {
        let req = self
            .client
            .get(format!("{}/videos", self.api_base))
            .query(&[("part", "snippet"), ("id", identifier)]);

        let value = self.send(req).await?;
        let title = value
            .get("items")
            .and_then(|items| items.get(0))
            .and_then(|item| item.pointer("/snippet/title"))
            .and_then(|t| t.as_str())
            .map(str::to_string);

        Ok(title.map(|title| VideoInfo {
            identifier: identifier.to_string(),
            title,
        }))
    }

    async fn insert(&self, identifier: &str) -> Result<VideoInfo, RemoteError> {
        let body = json!({
            "snippet": {
                "playlistId": self.playlist_id,
                "resourceId": {
                    "kind": "youtube#video",
                    "videoId": identifier,
                }
            }
        });
        let req = self
            .client
            .post(format!("{}/playlistItems", self.api_base))
            .query(&[("part", "snippet")])
            .json(&body);

        let value = self.send(req).await?;
        let title = value
            .pointer("/snippet/title")
            .and_then(|t| t.as_str())
            .unwrap_or(identifier)
            .to_string();

        Ok(VideoInfo {
            identifier: identifier.to_string(),
            title,
        })
    }
}
