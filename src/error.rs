use crate::writer::WriteError;
use thiserror::Error;
use yt_data_client::ApiError;
use yt_oauth::OAuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authorization failed: {0}")]
    Auth(#[from] OAuthError),

    #[error("error fetching comments: {0}")]
    Fetch(#[from] ApiError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
