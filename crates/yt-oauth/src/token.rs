use crate::OAuthError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access tokens are treated as expired this long before their real expiry
const EXPIRY_SKEW_MS: u64 = 60_000;

/// OAuth 2.0 token as persisted in the token file
///
/// Field names follow the layout Google's client libraries write, so a token
/// file produced by those tools loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Access token for API requests
    pub access_token: String,
    /// Refresh token, only issued when offline access was granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Granted scopes, space separated
    #[serde(default)]
    pub scope: String,
    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry time in milliseconds since the Unix epoch, 0 when unknown
    #[serde(default)]
    pub expiry_date: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

impl Credential {
    /// Granted scopes as a list
    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split_whitespace().collect()
    }

    /// Check if the token is expired or will expire within a minute
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }

    /// Same as [`Credential::is_expired`] against an explicit clock reading
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.expiry_date != 0 && now_ms + EXPIRY_SKEW_MS >= self.expiry_date
    }
}

/// Token file at a fixed path
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential, `None` when no token file exists
    pub async fn load(&self) -> Result<Option<Credential>, OAuthError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(OAuthError::ReadToken {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| OAuthError::ParseToken {
                path: self.path.clone(),
                source,
            })
    }

    /// Save the credential, replacing the file, with owner-only permissions
    pub async fn save(&self, credential: &Credential) -> Result<(), OAuthError> {
        let content = serde_json::to_string_pretty(credential).map_err(OAuthError::Serialize)?;

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| OAuthError::WriteToken {
                path: self.path.clone(),
                source,
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, permissions)
                .await
                .map_err(|source| OAuthError::WriteToken {
                    path: self.path.clone(),
                    source,
                })?;
        }

        Ok(())
    }
}
