mod common;

use axum::http::StatusCode;
use common::{MockState, ScriptedPrompt, UnreachablePrompt, app, serve, write_token_file};
use std::sync::Arc;
use tempfile::tempdir;
use yt_comment_poller::AppError;
use yt_oauth::CredentialStore;

#[tokio::test]
async fn stored_token_skips_authorization() {
    let state = Arc::new(MockState::with_comments(3));
    let base = serve(state.clone()).await;
    let dir = tempdir().unwrap();
    let token_path = dir.path().join("token.json");
    write_token_file(&token_path).await;

    let credential = app(&base, &token_path, UnreachablePrompt)
        .ensure_credential()
        .await
        .unwrap();

    assert_eq!(credential.access_token, "ya29.stored");
    assert!(state.token_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_token_authorizes_and_persists_before_fetching() {
    let dir = tempdir().unwrap();
    let token_path = dir.path().join("token.json");
    let state = Arc::new(MockState {
        watched_token_file: Some(token_path.clone()),
        ..MockState::with_comments(5)
    });
    let base = serve(state.clone()).await;
    let prompt = ScriptedPrompt::default();

    let count = app(&base, &token_path, prompt.clone())
        .run_once(&dir.path().join("comments.json"))
        .await
        .unwrap();

    assert_eq!(count, 5);
    assert_eq!(*prompt.asked.lock().unwrap(), 1);

    let token_requests = state.token_requests.lock().unwrap().clone();
    assert_eq!(token_requests.len(), 1);
    assert_eq!(token_requests[0]["grant_type"], "authorization_code");
    assert_eq!(token_requests[0]["code"], "4/mock-code");

    // every API call happened after the token file was written
    let seen = state.token_file_seen_by_api.lock().unwrap().clone();
    assert_eq!(seen, vec![true]);

    let stored = CredentialStore::new(&token_path).load().await.unwrap().unwrap();
    assert_eq!(stored.access_token, "ya29.mock");
    assert_eq!(stored.refresh_token.as_deref(), Some("1//mock"));
}

#[tokio::test]
async fn unparsable_token_file_triggers_authorization() {
    let dir = tempdir().unwrap();
    let token_path = dir.path().join("token.json");
    std::fs::write(&token_path, "{ truncated").unwrap();
    let state = Arc::new(MockState::with_comments(1));
    let base = serve(state.clone()).await;
    let prompt = ScriptedPrompt::default();

    let credential = app(&base, &token_path, prompt.clone())
        .ensure_credential()
        .await
        .unwrap();

    assert_eq!(credential.access_token, "ya29.mock");
    assert_eq!(*prompt.asked.lock().unwrap(), 1);
}

#[tokio::test]
async fn rejected_code_aborts_without_fetching_or_saving() {
    let dir = tempdir().unwrap();
    let token_path = dir.path().join("token.json");
    let output = dir.path().join("comments.json");
    let state = Arc::new(MockState {
        token_status: Some(StatusCode::BAD_REQUEST),
        ..MockState::with_comments(5)
    });
    let base = serve(state.clone()).await;

    let err = app(&base, &token_path, ScriptedPrompt::default())
        .run_once(&output)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(_)), "{err}");
    assert_eq!(state.comment_request_count(), 0);
    assert!(!token_path.exists());
    assert!(!output.exists());
}
