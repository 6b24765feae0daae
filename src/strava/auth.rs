//! Strava OAuth: authorization URL, code exchange, and token refresh.

use log::info;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::io::{BufRead, Write};

use super::client::{build_http_client, error_for_status};
use super::types::TokenResponse;
use crate::config::{Credentials, EnvFile, REFRESH_TOKEN_KEY};
use crate::error::{ActivityMapError, Result};

pub const DEFAULT_OAUTH_BASE: &str = "https://www.strava.com/oauth";

const REDIRECT_URI: &str = "http://localhost";
const SCOPE: &str = "activity:read_all";

/// URL the user opens to grant read access.
pub fn authorize_url(oauth_base: &str, client_id: &str) -> String {
    format!(
        "{}/authorize?client_id={}&response_type=code&redirect_uri={}&approval_prompt=force&scope={}",
        oauth_base.trim_end_matches('/'),
        client_id,
        REDIRECT_URI,
        SCOPE
    )
}

/// Pull the `code` query parameter out of the redirect URL the user pasted.
pub fn extract_code(redirect_url: &str) -> Result<String> {
    let url = Url::parse(redirect_url.trim())
        .map_err(|e| ActivityMapError::auth(format!("Invalid URL '{}': {}", redirect_url.trim(), e)))?;

    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ActivityMapError::auth("No code found in URL"))
}

/// OAuth token endpoint client.
pub struct OAuthClient {
    client: Client,
    oauth_base: String,
    client_id: String,
    client_secret: String,
}

impl OAuthClient {
    pub fn new(oauth_base: &str, credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            oauth_base: oauth_base.trim_end_matches('/').to_string(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
        })
    }

    pub fn authorize_url(&self) -> String {
        authorize_url(&self.oauth_base, &self.client_id)
    }

    async fn send_token_request(&self, body: Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/token", self.oauth_base))
            .json(&body)
            .send()
            .await?)
    }

    async fn post_token(&self, body: Value) -> Result<Value> {
        let response = error_for_status(self.send_token_request(body).await?).await?;
        Ok(response.json::<Value>().await?)
    }

    /// Exchange an authorization code for a refresh token.
    ///
    /// The body is inspected whatever the status: a rejected code and a reply
    /// without `refresh_token` both report the body.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let response = self
            .send_token_request(json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "code": code,
                "grant_type": "authorization_code",
            }))
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let refresh_token = serde_json::from_str::<TokenResponse>(&text)
            .ok()
            .filter(|_| status.is_success())
            .and_then(|tokens| tokens.refresh_token);
        refresh_token.ok_or_else(|| {
            ActivityMapError::auth(format!("Failed to get refresh token: {}", text))
        })
    }

    /// Trade a refresh token for a short-lived access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let body = self
            .post_token(json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "refresh_token": refresh_token,
                "grant_type": "refresh_token",
            }))
            .await
            .map_err(|e| ActivityMapError::auth(format!("Failed to refresh tokens: {}", e)))?;

        let tokens: TokenResponse = serde_json::from_value(body.clone())?;
        tokens.access_token.ok_or_else(|| {
            ActivityMapError::auth(format!("Token response had no access_token: {}", body))
        })
    }
}

/// Print the authorization instructions and read the pasted redirect URL.
pub fn prompt_for_code<R: BufRead, W: Write>(
    authorize_url: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    let io_err = |e: std::io::Error| ActivityMapError::io("<terminal>", e);

    writeln!(output, "\n--- Strava Sync Setup ---").map_err(io_err)?;
    writeln!(output, "No refresh token found. Let's get one.").map_err(io_err)?;
    writeln!(output, "\n1. Open this URL in your browser:\n{}", authorize_url).map_err(io_err)?;
    write!(
        output,
        "\n2. After authorizing, you will be redirected to a localhost URL. Paste the FULL URL here: "
    )
    .map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(io_err)?;
    extract_code(&line)
}

/// First-run setup: obtain a refresh token interactively and store it.
pub async fn interactive_setup<R: BufRead, W: Write>(
    oauth: &OAuthClient,
    env_file: &mut EnvFile,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    let code = prompt_for_code(&oauth.authorize_url(), input, output)?;
    let refresh_token = oauth.exchange_code(&code).await?;

    env_file.set(REFRESH_TOKEN_KEY, &refresh_token);
    env_file.save()?;
    info!(
        "Success! Refresh token saved to {}",
        env_file.path().display()
    );

    Ok(refresh_token)
}
