//! OAuth 2.0 support for the YouTube Data API.
//!
//! Covers the installed-app authorization code flow (the user pastes the code
//! shown after consent), persistence of the resulting token in the JSON
//! layout used by Google's client libraries, and refreshing expired access
//! tokens.

mod flow;
mod manager;
mod token;

pub use flow::{
    AuthorizationRequest, CodePrompt, ConsolePrompt, authorization_request, authorize,
    exchange_code, extract_code, generate_pkce, open_browser,
};
pub use manager::OAuthManager;
pub use token::{Credential, CredentialStore};

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Google's authorization endpoint
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's token endpoint (code exchange and refresh)
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scope required to read comment threads of any public video
pub const YOUTUBE_FORCE_SSL_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Errors raised while obtaining, storing or refreshing a credential
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("failed to read OAuth token file '{}': {source}", .path.display())]
    ReadToken {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse OAuth token file '{}': {source}", .path.display())]
    ParseToken {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write OAuth token file '{}': {source}", .path.display())]
    WriteToken {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize OAuth token: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("request to the token endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to {action} (status {status}): {body}")]
    TokenEndpoint {
        action: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid token endpoint response: {0}")]
    InvalidTokenResponse(#[source] serde_json::Error),

    #[error("failed to read the authorization code: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("no authorization code was entered")]
    EmptyCode,

    #[error("timed out after {0:?} waiting for the authorization code")]
    PromptTimeout(Duration),
}

/// OAuth client configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URI registered for the client
    pub redirect_uri: String,
    /// Requested scopes
    pub scopes: Vec<String>,
    /// Authorization endpoint the user is sent to
    pub auth_url: String,
    /// Token endpoint used for code exchange and refresh
    pub token_url: String,
}

impl OAuthConfig {
    /// Create a configuration with the YouTube scope and Google's endpoints
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes: vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Scopes as the single space-separated string OAuth expects
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}
