//! In-process stand-in for the YouTube Data API and Google's token endpoint.

#![allow(dead_code)]

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use yt_comment_poller::{App, Fetcher};
use yt_data_client::YouTubeClient;
use yt_oauth::{CodePrompt, Credential, CredentialStore, OAuthConfig, OAuthError};

pub const VIDEO_ID: &str = "g05DWYZUPv4";
const PAGE_SIZE: usize = 100;

#[derive(Default)]
pub struct MockState {
    /// Number of comment threads the video has
    pub total_comments: usize,
    /// Zero-based page index answered with HTTP 500
    pub failing_page: Option<usize>,
    /// Status returned by the token endpoint
    pub token_status: Option<StatusCode>,
    /// Token file whose presence is recorded on every API call
    pub watched_token_file: Option<PathBuf>,
    pub comment_requests: Mutex<Vec<HashMap<String, String>>>,
    pub video_requests: Mutex<usize>,
    pub token_requests: Mutex<Vec<HashMap<String, String>>>,
    pub token_file_seen_by_api: Mutex<Vec<bool>>,
}

impl MockState {
    pub fn with_comments(total_comments: usize) -> Self {
        Self {
            total_comments,
            ..Default::default()
        }
    }

    pub fn comment_request_count(&self) -> usize {
        self.comment_requests.lock().unwrap().len()
    }

    fn note_token_file(&self) {
        if let Some(path) = &self.watched_token_file {
            self.token_file_seen_by_api
                .lock()
                .unwrap()
                .push(path.exists());
        }
    }
}

/// Every third thread carries two replies, the rest have no `replies` field
fn thread(index: usize) -> Value {
    let has_replies = index % 3 == 0;
    let reply_count = if has_replies { 2 } else { 0 };
    let mut thread = json!({
        "kind": "youtube#commentThread",
        "id": format!("thread-{}", index),
        "snippet": {
            "videoId": VIDEO_ID,
            "topLevelComment": {
                "id": format!("comment-{}", index),
                "snippet": {
                    "authorDisplayName": format!("@user{}", index),
                    "textDisplay": format!("comment {}", index),
                    "textOriginal": format!("comment {}", index),
                    "likeCount": index,
                    "publishedAt": "2024-05-01T10:00:00Z"
                }
            },
            "totalReplyCount": reply_count
        }
    });
    if has_replies {
        thread["replies"] = json!({
            "comments": [
                { "id": format!("reply-{}-a", index), "snippet": { "textDisplay": format!("reply {}.a", index) } },
                { "id": format!("reply-{}-b", index), "snippet": { "textDisplay": format!("reply {}.b", index) } }
            ]
        });
    }
    thread
}

async fn comment_threads(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.note_token_file();
    let page: usize = params
        .get("pageToken")
        .and_then(|token| token.strip_prefix("page-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    state.comment_requests.lock().unwrap().push(params);

    if state.failing_page == Some(page) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backendError").into_response();
    }

    let start = page * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(state.total_comments);
    let items: Vec<Value> = (start..end).map(thread).collect();
    let mut body = json!({
        "kind": "youtube#commentThreadListResponse",
        "pageInfo": { "totalResults": items.len(), "resultsPerPage": PAGE_SIZE },
        "items": items
    });
    if end < state.total_comments {
        body["nextPageToken"] = json!(format!("page-{}", page + 1));
    }
    Json(body).into_response()
}

async fn videos(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.note_token_file();
    *state.video_requests.lock().unwrap() += 1;
    Json(json!({
        "kind": "youtube#videoListResponse",
        "items": [{
            "kind": "youtube#video",
            "id": VIDEO_ID,
            "snippet": {
                "publishedAt": "2024-04-30T08:00:00Z",
                "title": "Mock video",
                "description": "A video served by the test mock"
            },
            "statistics": {
                "viewCount": "1234",
                "likeCount": "56",
                "commentCount": state.total_comments.to_string()
            }
        }]
    }))
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_requests.lock().unwrap().push(form);
    match state.token_status {
        Some(status) if !status.is_success() => {
            (status, r#"{"error":"invalid_grant"}"#).into_response()
        }
        _ => Json(json!({
            "access_token": "ya29.mock",
            "refresh_token": "1//mock",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/youtube.force-ssl",
            "token_type": "Bearer"
        }))
        .into_response(),
    }
}

/// Serve the mock on an ephemeral port and return its base URL
pub async fn serve(state: Arc<MockState>) -> String {
    let app = Router::new()
        .route("/youtube/v3/commentThreads", get(comment_threads))
        .route("/youtube/v3/videos", get(videos))
        .route("/token", post(token))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

pub fn stored_credential() -> Credential {
    Credential {
        access_token: "ya29.stored".to_string(),
        refresh_token: Some("1//stored".to_string()),
        scope: "https://www.googleapis.com/auth/youtube.force-ssl".to_string(),
        token_type: "Bearer".to_string(),
        expiry_date: 0,
    }
}

pub async fn write_token_file(path: &Path) {
    CredentialStore::new(path)
        .save(&stored_credential())
        .await
        .unwrap();
}

/// Prompt that must never be reached
pub struct UnreachablePrompt;

impl CodePrompt for UnreachablePrompt {
    fn present(&mut self, auth_url: &str) {
        panic!("authorization flow started unexpectedly: {}", auth_url);
    }

    async fn read_code(&mut self) -> Result<String, OAuthError> {
        panic!("authorization code requested unexpectedly");
    }
}

/// Prompt that answers with a fixed code and counts how often it was asked
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    pub asked: Arc<Mutex<usize>>,
}

impl CodePrompt for ScriptedPrompt {
    fn present(&mut self, _auth_url: &str) {}

    async fn read_code(&mut self) -> Result<String, OAuthError> {
        *self.asked.lock().unwrap() += 1;
        Ok("4/mock-code".to_string())
    }
}

pub fn app<P: CodePrompt>(base_url: &str, token_path: &Path, prompt: P) -> App<P> {
    let http = reqwest::Client::new();
    let oauth = OAuthConfig::new(
        "client-id".to_string(),
        "client-secret".to_string(),
        "http://localhost/callback".to_string(),
    )
    .with_auth_url(format!("{}/auth", base_url))
    .with_token_url(format!("{}/token", base_url));

    App::new(
        http.clone(),
        oauth,
        CredentialStore::new(token_path),
        Fetcher::new(YouTubeClient::new(http, base_url), VIDEO_ID),
        prompt,
    )
}
