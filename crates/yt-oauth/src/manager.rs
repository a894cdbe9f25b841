use crate::flow::request_token;
use crate::{Credential, CredentialStore, OAuthConfig, OAuthError};

/// OAuth manager hands out access tokens, refreshing them when expired
pub struct OAuthManager {
    http: reqwest::Client,
    config: OAuthConfig,
    store: CredentialStore,
    credential: Credential,
}

impl OAuthManager {
    pub fn new(
        http: reqwest::Client,
        config: OAuthConfig,
        store: CredentialStore,
        credential: Credential,
    ) -> Self {
        Self {
            http,
            config,
            store,
            credential,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Get valid access token, refreshing if necessary
    ///
    /// Without a refresh token an expired access token is returned as is and
    /// the API call made with it reports the failure.
    pub async fn access_token(&mut self) -> Result<String, OAuthError> {
        if self.credential.is_expired() {
            match self.credential.refresh_token.clone() {
                Some(refresh_token) => self.refresh(&refresh_token).await?,
                None => tracing::warn!(
                    "access token expired and no refresh token is stored, re-run authorization"
                ),
            }
        }

        Ok(self.credential.access_token.clone())
    }

    /// Refresh the access token and persist the result
    async fn refresh(&mut self, refresh_token: &str) -> Result<(), OAuthError> {
        tracing::info!("refreshing OAuth access token");

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = request_token(&self.http, &self.config, "refresh OAuth token", &params).await?;

        self.credential = response.into_credential(
            Some(refresh_token.to_string()),
            self.credential.scope.clone(),
        );

        if let Err(e) = self.store.save(&self.credential).await {
            tracing::warn!(error = %e, "refreshed token could not be persisted");
        }

        tracing::info!("OAuth access token refreshed");
        Ok(())
    }
}
