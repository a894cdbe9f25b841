//! Minimal REST client for the YouTube Data API v3.
//!
//! Only the two listings the poller needs are covered: `videos.list` by id and
//! `commentThreads.list` by video, one page per call. Paging is left to the
//! caller.

mod models;

pub use models::*;

use thiserror::Error;

/// Public API host
pub const DEFAULT_API_ADDRESS: &str = "https://www.googleapis.com";

/// Largest page size `commentThreads.list` accepts
pub const MAX_COMMENT_THREADS_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to fetch {resource} (status {status}): {body}")]
    Status {
        resource: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid {resource} response: {source}")]
    Decode {
        resource: &'static str,
        source: serde_json::Error,
    },

    #[error("no video found with ID '{0}'")]
    VideoNotFound(String),
}

pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    /// `base_url` is the API host, e.g. [`DEFAULT_API_ADDRESS`]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// One page of `videos.list` for a single id
    pub async fn list_videos(
        &self,
        access_token: &str,
        video_id: &str,
        parts: &[&str],
    ) -> Result<VideoListResponse, ApiError> {
        let url = format!("{}/youtube/v3/videos", self.base_url);
        let query = [("part", parts.join(",")), ("id", video_id.to_string())];
        self.get_json("video data", &url, access_token, &query).await
    }

    /// The first video of `videos.list`, or [`ApiError::VideoNotFound`]
    pub async fn video(
        &self,
        access_token: &str,
        video_id: &str,
        parts: &[&str],
    ) -> Result<Video, ApiError> {
        self.list_videos(access_token, video_id, parts)
            .await?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::VideoNotFound(video_id.to_string()))
    }

    /// One page of `commentThreads.list` for a video
    pub async fn list_comment_threads(
        &self,
        access_token: &str,
        video_id: &str,
        parts: &[&str],
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, ApiError> {
        let url = format!("{}/youtube/v3/commentThreads", self.base_url);
        let mut query = vec![
            ("part", parts.join(",")),
            ("videoId", video_id.to_string()),
            ("maxResults", MAX_COMMENT_THREADS_PER_PAGE.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        self.get_json("comment threads", &url, access_token, &query)
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        resource: &'static str,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        tracing::debug!(url, ?query, "GET");

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                resource,
                status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { resource, source })
    }
}
