use crate::config::{CalendarConfig, TokenStoreKind};
use crate::error::{token_error, BotResult};
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client as RedisClient};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Google OAuth token endpoint
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Redis key of the stored token
pub const REDIS_TOKEN_KEY: &str = "google_calendar_token";
/// Tokens this close to expiry are refreshed ahead of time
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token as persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp after which `access_token` is no longer valid
    pub expires_at: i64,
}

impl StoredToken {
    /// Build a token from an OAuth token endpoint response
    pub fn from_response(response: &TokenResponse, previous_refresh: Option<String>) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone().or(previous_refresh),
            expires_at: Utc::now().timestamp() + response.expires_in.unwrap_or(3600),
        }
    }

    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS > now
    }
}

/// Body of a successful token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Persistence for the OAuth token
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> BotResult<Option<StoredToken>>;
    async fn save(&self, token: &StoredToken) -> BotResult<()>;
}

/// Token kept in a JSON file
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> BotResult<Option<StoredToken>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &StoredToken) -> BotResult<()> {
        let content = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// Token kept under a Redis key
pub struct RedisTokenStore {
    client: RedisClient,
    key: String,
}

impl RedisTokenStore {
    pub fn new(redis_url: &str) -> BotResult<Self> {
        let client = RedisClient::open(redis_url)?;
        Ok(Self {
            client,
            key: REDIS_TOKEN_KEY.to_string(),
        })
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn load(&self) -> BotResult<Option<StoredToken>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(&self.key).await?;
        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, token: &StoredToken) -> BotResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(token)?;
        let _: () = conn.set(&self.key, json).await?;
        Ok(())
    }
}

/// Open the token store selected by configuration
pub fn open_token_store(config: &CalendarConfig) -> BotResult<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match config.token_store {
        TokenStoreKind::File => Arc::new(FileTokenStore::new(config.token_path.clone())),
        TokenStoreKind::Redis => Arc::new(RedisTokenStore::new(&config.redis_url)?),
    };
    Ok(store)
}

/// Hands out valid access tokens, refreshing them when they expire
#[derive(Clone)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    token_url: String,
    store: Arc<dyn TokenStore>,
    client: Client,
    timeout: Duration,
}

impl TokenManager {
    pub fn new(client_id: String, client_secret: String, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client_id,
            client_secret,
            token_url: TOKEN_URL.to_string(),
            store,
            client: Client::new(),
            timeout: crate::calendar::REQUEST_TIMEOUT,
        }
    }

    /// Use a different token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Timeout of the refresh request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get a valid access token, refreshing the stored one if needed
    pub async fn get_token(&self) -> BotResult<String> {
        let token = self.store.load().await?.ok_or_else(|| {
            token_error("No stored token found. Authorize calendar access first.")
        })?;

        if token.is_fresh(Utc::now().timestamp()) {
            debug!("Using stored access token");
            return Ok(token.access_token);
        }

        info!("Access token expired, refreshing");
        let refreshed = self.refresh_token(&token).await?;
        Ok(refreshed.access_token)
    }

    /// Refresh an expired token and persist the result
    async fn refresh_token(&self, token: &StoredToken) -> BotResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| token_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| token_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(token_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| token_error(&format!("Failed to parse token response: {}", e)))?;

        let refreshed = StoredToken::from_response(&body, Some(refresh_token));
        self.store.save(&refreshed).await?;
        Ok(refreshed)
    }

    /// Store a token obtained from the consent flow
    pub async fn set_token(&self, token: &StoredToken) -> BotResult<()> {
        self.store.save(token).await
    }
}
