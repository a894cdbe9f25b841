use crate::scheduler::OverlapPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use yt_data_client::DEFAULT_API_ADDRESS;
use yt_oauth::{DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL, OAuthConfig};

/// Video whose comments are fetched when `--video-id` is not given
pub const DEFAULT_VIDEO_ID: &str = "g05DWYZUPv4";

/// Polling interval when `--interval-ms` is not given
pub const DEFAULT_INTERVAL_MS: u64 = 60_000;

/// YouTube Comment Poller - Saves the comments of a YouTube video, once or on a timer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// OAuth client ID
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Redirect URI registered for the OAuth client
    #[arg(long, env = "GOOGLE_REDIRECT_URI")]
    pub redirect_uri: String,

    /// YouTube video ID to fetch comments from
    #[arg(long, default_value = DEFAULT_VIDEO_ID)]
    pub video_id: String,

    /// Path to the OAuth token file; authorization runs when it is missing
    #[arg(long, default_value = "token.json")]
    pub token_path: PathBuf,

    /// Give up waiting for the authorization code after this many seconds (default: wait forever)
    #[arg(long)]
    pub code_timeout_secs: Option<u64>,

    /// YouTube Data API host
    #[arg(long, env = "REST_API_ADDRESS", default_value = DEFAULT_API_ADDRESS)]
    pub rest_api_address: String,

    /// OAuth authorization endpoint
    #[arg(long, env = "OAUTH_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    pub auth_url: String,

    /// OAuth token endpoint
    #[arg(long, env = "OAUTH_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch all top-level comment texts once and save them as a JSON array
    Once {
        /// Path to output file
        #[arg(long, default_value = "comments.json")]
        output_file: PathBuf,
    },

    /// Periodically save video metadata and comment threads with replies
    Poll {
        /// Path to output file, replaced after every successful cycle
        #[arg(long, default_value = "snapshot.json")]
        output_file: PathBuf,

        /// Time between polling cycles in milliseconds
        #[arg(long, default_value_t = DEFAULT_INTERVAL_MS, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,

        /// How to handle a tick that arrives while a cycle is still running
        #[arg(long, value_enum, default_value_t = OverlapPolicy::Skip)]
        overlap: OverlapPolicy,
    },
}

impl Cli {
    pub fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_uri.clone(),
        )
        .with_auth_url(&self.auth_url)
        .with_token_url(&self.token_url)
    }

    pub fn code_timeout(&self) -> Option<Duration> {
        self.code_timeout_secs.map(Duration::from_secs)
    }
}
