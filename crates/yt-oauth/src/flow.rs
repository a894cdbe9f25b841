use crate::token::now_millis;
use crate::{Credential, OAuthConfig, OAuthError};
use serde::Deserialize;
use std::future::Future;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::sync::oneshot;

/// Authorization URL together with the PKCE verifier needed to redeem its code
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub verifier: String,
}

/// Token endpoint response, shared by the code exchange and refresh grants
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Turn the response into a credential, keeping `fallback_refresh` and
    /// `fallback_scope` when the endpoint omits them
    pub(crate) fn into_credential(
        self,
        fallback_refresh: Option<String>,
        fallback_scope: String,
    ) -> Credential {
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh),
            scope: self.scope.unwrap_or(fallback_scope),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expiry_date: self
                .expires_in
                .map(|secs| now_millis() + secs * 1000)
                .unwrap_or_default(),
        }
    }
}

/// Console side of the authorization flow
///
/// `present` shows the authorization URL, `read_code` suspends until the user
/// supplies the code obtained after consent.
pub trait CodePrompt {
    fn present(&mut self, auth_url: &str);

    fn read_code(&mut self) -> impl Future<Output = Result<String, OAuthError>> + Send;
}

/// Prompt on stderr/stdin that also tries to open the URL in a browser
#[derive(Debug, Clone, Default)]
pub struct ConsolePrompt {
    timeout: Option<Duration>,
}

impl ConsolePrompt {
    /// `timeout` bounds the wait for the code; `None` waits indefinitely
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CodePrompt for ConsolePrompt {
    fn present(&mut self, auth_url: &str) {
        eprintln!("\n=================================================");
        eprintln!("OAuth 2.0 Authorization Required");
        eprintln!("=================================================");
        eprintln!("\nAuthorize this app by visiting this URL:\n");
        eprintln!("{}\n", auth_url);
        eprintln!("=================================================\n");

        if let Err(e) = open_browser(auth_url) {
            tracing::warn!(error = %e, "could not open a browser, open the URL above manually");
        }
    }

    async fn read_code(&mut self) -> Result<String, OAuthError> {
        eprint!("Enter the code from that page here: ");
        self.read_line_with(|line| std::io::stdin().read_line(line))
            .await
    }
}

impl ConsolePrompt {
    /// Run `read_line` on its own thread and wait for the line, bounded by
    /// the timeout
    ///
    /// A blocked read cannot be cancelled; on timeout the thread is left
    /// behind and never joined.
    async fn read_line_with<F>(&self, read_line: F) -> Result<String, OAuthError>
    where
        F: FnOnce(&mut String) -> std::io::Result<usize> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let mut line = String::new();
            let _ = tx.send(read_line(&mut line).map(|_| line));
        });

        let received = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, rx)
                .await
                .map_err(|_| OAuthError::PromptTimeout(limit))?,
            None => rx.await,
        };
        let line = received
            .map_err(|_| OAuthError::Prompt(std::io::Error::other("input reader stopped")))?
            .map_err(OAuthError::Prompt)?;

        extract_code(&line).ok_or(OAuthError::EmptyCode)
    }
}

/// Pull the authorization code out of what the user typed
///
/// Accepts the bare code or the whole redirect URL copied from the browser's
/// address bar.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let Some((_, query)) = input.split_once('?') else {
        return Some(input.to_string());
    };

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "code")
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|code| code.into_owned())
        .filter(|code| !code.is_empty())
}

/// Launch the platform's URL handler, without waiting for it
pub fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("rundll32");
        command.arg("url.dll,FileProtocolHandler");
        command
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = Command::new("xdg-open");

    let mut child = command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

/// Generate PKCE verifier and challenge
pub fn generate_pkce() -> (String, String) {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use rand::Rng;
    use rand::distributions::Alphanumeric;
    use sha2::{Digest, Sha256};

    let verifier: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();

    // challenge = base64url(SHA256(verifier))
    let hash = Sha256::digest(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hash);

    (verifier, challenge)
}

/// Build the consent URL, requesting offline access so a refresh token is issued
pub fn authorization_request(config: &OAuthConfig) -> AuthorizationRequest {
    let (verifier, challenge) = generate_pkce();

    let url = format!(
        "{}?\
        client_id={}&\
        redirect_uri={}&\
        response_type=code&\
        scope={}&\
        code_challenge={}&\
        code_challenge_method=S256&\
        access_type=offline&\
        prompt=consent",
        config.auth_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&config.scope_param()),
        urlencoding::encode(&challenge),
    );

    AuthorizationRequest { url, verifier }
}

/// POST a grant to the token endpoint and decode the reply
pub(crate) async fn request_token(
    http: &reqwest::Client,
    config: &OAuthConfig,
    action: &'static str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, OAuthError> {
    let response = http.post(&config.token_url).form(params).send().await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(OAuthError::TokenEndpoint {
            action,
            status,
            body,
        });
    }

    serde_json::from_str(&body).map_err(OAuthError::InvalidTokenResponse)
}

/// Exchange authorization code for tokens
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
) -> Result<Credential, OAuthError> {
    tracing::info!("exchanging authorization code for tokens");

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];
    let response = request_token(http, config, "exchange authorization code", &params).await?;

    if response.refresh_token.is_none() {
        tracing::warn!("token endpoint issued no refresh token, re-authorization will be needed on expiry");
    }
    Ok(response.into_credential(None, config.scope_param()))
}

/// Run the interactive authorization code flow
///
/// The returned credential is not persisted here; callers save it before
/// using it.
pub async fn authorize<P: CodePrompt>(
    http: &reqwest::Client,
    config: &OAuthConfig,
    prompt: &mut P,
) -> Result<Credential, OAuthError> {
    let request = authorization_request(config);
    prompt.present(&request.url);

    let code = prompt.read_code().await?;
    let credential = exchange_code(http, config, &code, &request.verifier).await?;

    tracing::info!("obtained OAuth tokens");
    Ok(credential)
}
