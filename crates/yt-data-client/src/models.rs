use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_results: i64,
    #[serde(default)]
    pub results_per_page: i64,
}

/// Response of `GET /youtube/v3/videos`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub etag: String,
    pub id: String,
    #[serde(default)]
    pub snippet: Option<VideoSnippet>,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
}

/// Counters arrive as decimal strings; any of them may be hidden by the owner
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    pub fn views(&self) -> Option<u64> {
        parse_count(self.view_count.as_deref())
    }

    pub fn likes(&self) -> Option<u64> {
        parse_count(self.like_count.as_deref())
    }

    pub fn comments(&self) -> Option<u64> {
        parse_count(self.comment_count.as_deref())
    }
}

fn parse_count(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}

/// Response of `GET /youtube/v3/commentThreads`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadListResponse {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<CommentThread>,
}

impl CommentThreadListResponse {
    /// Continuation token for the next page; an empty token means there is none
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(default)]
    pub id: String,
    pub snippet: CommentThreadSnippet,
    /// Absent when the `replies` part was not requested or the thread has none
    #[serde(default)]
    pub replies: Option<CommentThreadReplies>,
}

impl CommentThread {
    pub fn top_level(&self) -> &CommentSnippet {
        &self.snippet.top_level_comment.snippet
    }

    /// Display texts of the replies, empty when the thread carries none
    pub fn reply_texts(&self) -> Vec<String> {
        self.replies
            .iter()
            .flat_map(|replies| &replies.comments)
            .map(|reply| reply.snippet.text_display.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    #[serde(default)]
    pub video_id: String,
    pub top_level_comment: Comment,
    #[serde(default)]
    pub total_reply_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadReplies {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    pub snippet: CommentSnippet,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub text_display: String,
    #[serde(default)]
    pub text_original: String,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub published_at: String,
}
