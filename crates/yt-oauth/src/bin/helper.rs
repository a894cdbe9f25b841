use clap::Parser;
use std::time::Duration;
use yt_oauth::{ConsolePrompt, CredentialStore, DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL, OAuthConfig};

/// OAuth 2.0 helper tool: runs the authorization flow and saves the token file
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// OAuth client ID
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    client_id: String,

    /// OAuth client secret
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Redirect URI registered for the client
    #[arg(long, env = "GOOGLE_REDIRECT_URI")]
    redirect_uri: String,

    /// Path to save the OAuth token file
    #[arg(long, default_value = "token.json")]
    token_path: String,

    /// Give up waiting for the authorization code after this many seconds
    #[arg(long)]
    code_timeout_secs: Option<u64>,

    /// Authorization endpoint
    #[arg(long, env = "OAUTH_AUTH_URL", default_value = DEFAULT_AUTH_URL)]
    auth_url: String,

    /// Token endpoint
    #[arg(long, env = "OAUTH_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    token_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = OAuthConfig::new(args.client_id, args.client_secret, args.redirect_uri)
        .with_auth_url(args.auth_url)
        .with_token_url(args.token_url);
    let mut prompt = ConsolePrompt::new(args.code_timeout_secs.map(Duration::from_secs));

    let token = yt_oauth::authorize(&reqwest::Client::new(), &config, &mut prompt).await?;

    let store = CredentialStore::new(&args.token_path);
    store.save(&token).await?;

    eprintln!("\nOAuth token saved to: {}", args.token_path);
    eprintln!("You can now use this token with yt-comment-poller");

    Ok(())
}
