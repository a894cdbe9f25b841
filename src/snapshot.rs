use serde::{Deserialize, Serialize};
use yt_data_client::{CommentThread, Video};

/// Video summary written by the poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
}

impl From<Video> for VideoRecord {
    fn from(video: Video) -> Self {
        let snippet = video.snippet.unwrap_or_default();
        let statistics = video.statistics.unwrap_or_default();
        Self {
            id: video.id,
            title: snippet.title,
            description: snippet.description,
            published_at: snippet.published_at,
            view_count: statistics.views(),
            like_count: statistics.likes(),
            comment_count: statistics.comments(),
        }
    }
}

/// Top-level comment with the display texts of its replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub author: String,
    pub text: String,
    pub like_count: u64,
    pub published_at: String,
    pub replies: Vec<String>,
}

impl From<&CommentThread> for CommentRecord {
    fn from(thread: &CommentThread) -> Self {
        let top = thread.top_level();
        Self {
            author: top.author_display_name.clone(),
            text: top.text_display.clone(),
            like_count: top.like_count,
            published_at: top.published_at.clone(),
            replies: thread.reply_texts(),
        }
    }
}

/// Everything one polling cycle collected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSnapshot {
    pub video: VideoRecord,
    pub comments: Vec<CommentRecord>,
}
