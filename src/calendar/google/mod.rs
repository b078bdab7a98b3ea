pub mod token;

pub use token::{open_token_store, StoredToken, TokenManager, TokenStore};

use super::models::RawEvent;
use super::{CalendarSource, REQUEST_TIMEOUT};
use crate::config::CalendarConfig;
use crate::error::{calendar_error, BotResult};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Google Calendar API root
pub const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

/// Calendar source backed by the Google Calendar API
pub struct GoogleCalendarSource {
    calendar_id: String,
    token_manager: TokenManager,
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl GoogleCalendarSource {
    pub fn new(calendar_id: String, token_manager: TokenManager) -> Self {
        Self {
            calendar_id,
            token_manager,
            client: Client::new(),
            api_base: API_BASE.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Build the source from calendar configuration
    pub fn from_config(config: &CalendarConfig) -> BotResult<Self> {
        let (client_id, client_secret) = config.google_credentials()?;
        let store = open_token_store(config)?;
        let token_manager = TokenManager::new(client_id, client_secret, store);
        Ok(Self::new(config.google_calendar_id.clone(), token_manager))
    }

    /// Timeout of the events request; the token refresh has its own
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn events_url(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> BotResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| calendar_error("API base cannot be a base URL"))?
            .pop_if_empty()
            .push("calendars")
            .push(&self.calendar_id)
            .push("events");

        url.query_pairs_mut()
            .append_pair("timeMin", &start.to_rfc3339())
            .append_pair("timeMax", &end.to_rfc3339())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        Ok(url)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarSource {
    fn name(&self) -> &'static str {
        "google_calendar"
    }

    async fn list_events_between(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> BotResult<Vec<RawEvent>> {
        let access_token = self.token_manager.get_token().await?;
        let url = self.events_url(&start, &end)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: EventsResponse = response
            .json()
            .await
            .map_err(|e| calendar_error(&format!("Failed to parse events response: {}", e)))?;

        info!("Google Calendar returned {} events", body.items.len());
        Ok(body.items)
    }
}
