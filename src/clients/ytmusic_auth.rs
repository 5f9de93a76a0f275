use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::clients::errors::{Error, Result};

const DEVICE_CODE_URL: &str = "https://oauth2.googleapis.com/device/code";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/youtube";
const DEVICE_GRANT_TYPE: &str = "http://oauth.net/grant_type/device/1.0";
// Refresh tokens this close to expiry instead of risking a 401 mid-transfer
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Contents of the destination credentials file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: i64, // epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl OAuthToken {
    pub fn is_expiring(&self, now: i64) -> bool {
        now + EXPIRY_MARGIN_SECS >= self.expires_at
    }

    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    token_type: String,
}

#[derive(Deserialize, Debug)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_url: String,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Whether a destination handle can be built from the credentials file right now
#[derive(Debug)]
pub enum AuthState {
    Authenticated(OAuthToken),
    SetupRequired,
    Unreadable(Error),
}

/// OAuth client registered for the YouTube Data API ("TVs and Limited Input devices")
#[derive(Debug, Clone)]
pub struct OAuthClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|e| Error::ConfigurationError(format!("{name}: {e}")))
}

impl OAuthClientCredentials {
    pub fn try_default() -> Result<Self> {
        Ok(OAuthClientCredentials {
            client_id: env_var("YTMUSIC_CLIENT_ID")?,
            client_secret: env_var("YTMUSIC_CLIENT_SECRET")?,
        })
    }
}

/// Persisted credentials for the destination catalog plus the flows that create and refresh them.
/// The OAuth client is only needed for setup and refresh; without one it is read from the
/// environment at that point.
pub struct YtMusicAuth {
    path: PathBuf,
    credentials: Option<OAuthClientCredentials>,
    http: reqwest::Client,
}

impl YtMusicAuth {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        YtMusicAuth {
            path: path.into(),
            credentials: None,
            http: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: OAuthClientCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn credentials(&self) -> Result<OAuthClientCredentials> {
        match &self.credentials {
            Some(credentials) => Ok(credentials.clone()),
            None => OAuthClientCredentials::try_default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn state(&self) -> AuthState {
        load_token(&self.path).await
    }

    /// Returns a token that is valid for at least the expiry margin, refreshing it if needed.
    pub async fn valid_token(&self) -> Result<OAuthToken> {
        let token = match self.state().await {
            AuthState::Authenticated(token) => token,
            AuthState::SetupRequired => return Err(Error::SetupRequired(self.path.clone())),
            AuthState::Unreadable(err) => return Err(err),
        };
        if !token.is_expiring(Utc::now().timestamp()) {
            return Ok(token);
        }
        debug!("YouTube Music token near expiry, refreshing");
        let refreshed = self.refresh(&token).await?;
        self.store(&refreshed).await?;
        Ok(refreshed)
    }

    async fn refresh(&self, token: &OAuthToken) -> Result<OAuthToken> {
        let credentials = self.credentials()?;
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
        ];
        let response = self.token_request(&params).await?;
        Ok(OAuthToken {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .unwrap_or_else(|| token.refresh_token.clone()),
            token_type: response.token_type,
            expires_at: Utc::now().timestamp() + response.expires_in,
            expires_in: Some(response.expires_in),
            scope: response.scope.or_else(|| token.scope.clone()),
        })
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self.http.post(TOKEN_URL).form(&params).send().await?;
        let body: serde_json::Value = response.json().await?;
        if let Ok(err) = serde_json::from_value::<ErrorResponse>(body.clone()) {
            return Err(Error::YtMusicAuthError(format!(
                "{}: {}",
                err.error,
                err.error_description.unwrap_or_default()
            )));
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn store(&self, token: &OAuthToken) -> Result<()> {
        let contents = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, contents).await?;
        debug!("Stored YouTube Music credentials in {:?}", self.path);
        Ok(())
    }

    /// Interactive device-code flow. Prints a verification URL and code, waits for the user
    /// to confirm, then writes the credentials file. Does nothing if the file already exists.
    pub async fn setup_oauth(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path).await? {
            println!(
                "Credentials file {:?} already exists. Delete it to run the setup again.",
                self.path
            );
            return Ok(());
        }

        let result = self.run_device_flow().await;
        if result.is_err() && tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            warn!("Removing incomplete credentials file {:?}", self.path);
            if let Err(e) = tokio::fs::remove_file(&self.path).await {
                warn!("Failed to remove credentials file {:?}: {e}", self.path);
            }
        }
        result
    }

    async fn run_device_flow(&self) -> Result<()> {
        let credentials = self.credentials()?;
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("scope", OAUTH_SCOPE),
        ];
        let device: DeviceCodeResponse = self
            .http
            .post(DEVICE_CODE_URL)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        println!(
            "Go to {}?user_code={}, finish the login flow and press Enter when done",
            device.verification_url, device.user_code
        );
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", DEVICE_GRANT_TYPE),
            ("code", device.device_code.as_str()),
        ];
        let response = self.token_request(&params).await?;
        let refresh_token = response.refresh_token.ok_or_else(|| {
            Error::YtMusicAuthError("token response did not include a refresh token".into())
        })?;
        let token = OAuthToken {
            access_token: response.access_token,
            refresh_token,
            token_type: response.token_type,
            expires_at: Utc::now().timestamp() + response.expires_in,
            expires_in: Some(response.expires_in),
            scope: response.scope,
        };
        self.store(&token).await?;
        println!("YouTube Music setup complete, credentials saved to {:?}", self.path);
        Ok(())
    }
}

/// Reads the credentials file without touching the network
pub async fn load_token(path: &Path) -> AuthState {
    match tokio::fs::try_exists(path).await {
        Ok(true) => match tokio::fs::read_to_string(path).await {
            Ok(contents) => match serde_json::from_str::<OAuthToken>(&contents) {
                Ok(token) => {
                    debug!("Loaded YouTube Music credentials from {path:?}");
                    AuthState::Authenticated(token)
                }
                Err(e) => AuthState::Unreadable(Error::from(e)),
            },
            Err(e) => AuthState::Unreadable(Error::from(e)),
        },
        Ok(false) => {
            debug!("No YouTube Music credentials found in {path:?}");
            AuthState::SetupRequired
        }
        Err(e) => AuthState::Unreadable(Error::from(e)),
    }
}
