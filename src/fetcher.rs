use crate::snapshot::{CommentRecord, MediaSnapshot, VideoRecord};
use yt_data_client::{ApiError, CommentThread, YouTubeClient};

/// Collects the comments (and, for snapshots, the metadata) of one video
pub struct Fetcher {
    client: YouTubeClient,
    video_id: String,
}

impl Fetcher {
    pub fn new(client: YouTubeClient, video_id: impl Into<String>) -> Self {
        Self {
            client,
            video_id: video_id.into(),
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Display texts of every top-level comment, in API order
    pub async fn comment_texts(&self, access_token: &str) -> Result<Vec<String>, ApiError> {
        let threads = self.comment_threads(access_token, &["snippet"]).await?;
        Ok(threads
            .into_iter()
            .map(|thread| thread.snippet.top_level_comment.snippet.text_display)
            .collect())
    }

    /// Video summary plus every comment thread with its replies
    pub async fn snapshot(&self, access_token: &str) -> Result<MediaSnapshot, ApiError> {
        let video = self
            .client
            .video(access_token, &self.video_id, &["snippet", "statistics"])
            .await?;
        let threads = self
            .comment_threads(access_token, &["snippet", "replies"])
            .await?;

        Ok(MediaSnapshot {
            video: VideoRecord::from(video),
            comments: threads.iter().map(CommentRecord::from).collect(),
        })
    }

    /// Walk `commentThreads.list` until a page comes back without a continuation token
    ///
    /// A failing page drops everything collected so far.
    async fn comment_threads(
        &self,
        access_token: &str,
        parts: &[&str],
    ) -> Result<Vec<CommentThread>, ApiError> {
        let mut threads = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .client
                .list_comment_threads(access_token, &self.video_id, parts, page_token.as_deref())
                .await?;
            pages += 1;

            page_token = page.continuation().map(str::to_string);
            threads.extend(page.items);

            if page_token.is_none() {
                break;
            }
        }

        tracing::debug!(
            video_id = %self.video_id,
            pages,
            threads = threads.len(),
            "comment threads collected"
        );
        Ok(threads)
    }
}
