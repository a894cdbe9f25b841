use crate::error::AppError;
use crate::fetcher::Fetcher;
use crate::scheduler::Scheduler;
use crate::writer::write_json;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use yt_oauth::{CodePrompt, Credential, CredentialStore, OAuthConfig, OAuthManager};

/// Wires the credential store, authorization flow and fetcher together
pub struct App<P> {
    http: reqwest::Client,
    oauth: OAuthConfig,
    store: CredentialStore,
    fetcher: Fetcher,
    prompt: P,
}

impl<P: CodePrompt> App<P> {
    pub fn new(
        http: reqwest::Client,
        oauth: OAuthConfig,
        store: CredentialStore,
        fetcher: Fetcher,
        prompt: P,
    ) -> Self {
        Self {
            http,
            oauth,
            store,
            fetcher,
            prompt,
        }
    }

    /// Load the stored credential, or authorize interactively and persist the result
    ///
    /// An unreadable token file is treated like a missing one.
    pub async fn ensure_credential(&mut self) -> Result<Credential, AppError> {
        match self.store.load().await {
            Ok(Some(credential)) => {
                tracing::info!(path = %self.store.path().display(), "token loaded from file");
                return Ok(credential);
            }
            Ok(None) => {
                tracing::info!(path = %self.store.path().display(), "no token file, authorization required");
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unusable token file, authorization required");
            }
        }

        let credential = yt_oauth::authorize(&self.http, &self.oauth, &mut self.prompt).await?;
        self.store.save(&credential).await?;
        tracing::info!(path = %self.store.path().display(), "token stored");
        Ok(credential)
    }

    fn token_manager(&self, credential: Credential) -> OAuthManager {
        OAuthManager::new(
            self.http.clone(),
            self.oauth.clone(),
            self.store.clone(),
            credential,
        )
    }

    /// Save every top-level comment text once; returns how many were saved
    pub async fn run_once(mut self, output: &Path) -> Result<usize, AppError> {
        let credential = self.ensure_credential().await?;
        let access_token = self.token_manager(credential).access_token().await?;

        let comments = self.fetcher.comment_texts(&access_token).await?;
        write_json(output, &comments).await?;

        tracing::info!(
            count = comments.len(),
            path = %output.display(),
            "fetched comments"
        );
        Ok(comments.len())
    }

    /// Authorize, then write a fresh snapshot on every scheduler tick until `shutdown`
    ///
    /// Only authorization failures end the run early; failed cycles are logged
    /// and the next tick tries again.
    pub async fn run_poll<S>(
        mut self,
        output: PathBuf,
        scheduler: Scheduler,
        shutdown: S,
    ) -> Result<(), AppError>
    where
        S: Future<Output = ()>,
    {
        let credential = self.ensure_credential().await?;
        let cycle = Arc::new(PollCycle {
            oauth: Mutex::new(self.token_manager(credential)),
            fetcher: self.fetcher,
            output,
        });

        tracing::info!(video_id = %cycle.fetcher.video_id(), path = %cycle.output.display(), "polling started");
        scheduler
            .run(
                move || {
                    let cycle = cycle.clone();
                    async move { cycle.run().await }
                },
                shutdown,
            )
            .await;
        tracing::info!("polling stopped");
        Ok(())
    }
}

/// State shared by every polling cycle
struct PollCycle {
    oauth: Mutex<OAuthManager>,
    fetcher: Fetcher,
    output: PathBuf,
}

impl PollCycle {
    async fn run(&self) {
        let access_token = {
            let mut oauth = self.oauth.lock().await;
            oauth.access_token().await
        };
        let access_token = match access_token {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "could not obtain an access token");
                return;
            }
        };

        let snapshot = match self.fetcher.snapshot(&access_token).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "error fetching snapshot, nothing written");
                return;
            }
        };

        match write_json(&self.output, &snapshot).await {
            Ok(()) => tracing::info!(
                comments = snapshot.comments.len(),
                path = %self.output.display(),
                "snapshot saved"
            ),
            Err(e) => tracing::error!(error = %e, "error saving snapshot"),
        }
    }
}
