pub mod context;
pub mod llm;
pub mod prompt;
pub mod responder;
pub mod router;

pub use context::{build_event_context, format_events};
pub use llm::{LanguageModel, RigModel};
pub use prompt::PromptBuilder;
pub use responder::Responder;
pub use router::{route_message, MenuOption};

use crate::calendar::{day_range, events_in_window, upcoming_7_days_range, CalendarSource};
use crate::config::{AssistantProfile, Config};
use crate::error::BotResult;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Conversation state exchanged with the client; carries nothing yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {}

/// Incoming chat request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatPayload {
    /// Missing or non-string messages read as empty text
    #[serde(default, deserialize_with = "or_default")]
    pub message: String,
    /// Accepted and ignored
    #[serde(default, deserialize_with = "or_default")]
    pub conversation_state: ConversationState,
}

impl ChatPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_state: ConversationState::default(),
        }
    }

    /// Parse a request body; anything unreadable becomes an empty payload
    pub fn from_slice(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// Outgoing chat reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    pub reply: String,
    pub state: ConversationState,
}

impl ChatResult {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            state: ConversationState::default(),
        }
    }
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Answers chat messages from calendar data and the language model
#[derive(Clone)]
pub struct ChatService {
    calendar: Arc<dyn CalendarSource>,
    responder: Responder,
    prompts: PromptBuilder,
    tz: Tz,
}

impl ChatService {
    pub fn new(
        calendar: Arc<dyn CalendarSource>,
        responder: Responder,
        profile: &AssistantProfile,
        tz: Tz,
    ) -> Self {
        Self {
            calendar,
            responder,
            prompts: PromptBuilder::new(profile),
            tz,
        }
    }

    /// Build the service with the sources and model selected by configuration
    pub fn from_config(config: &Config) -> BotResult<Self> {
        let calendar = crate::calendar::build_source(&config.calendar, config.timezone)?;
        let responder = Responder::from_config(&config.llm);
        Ok(Self::new(calendar, responder, &config.profile, config.timezone))
    }

    /// Answer a message as of the current instant
    pub async fn handle(&self, payload: &ChatPayload) -> BotResult<ChatResult> {
        let now = Utc::now().with_timezone(&self.tz);
        self.handle_at(payload, now).await
    }

    /// Answer a message as of `now`
    pub async fn handle_at(&self, payload: &ChatPayload, now: DateTime<Tz>) -> BotResult<ChatResult> {
        let intent = route_message(&payload.message);
        debug!("Routed message to intent: {:?}", intent);

        let event_context = self.event_context(now).await;
        let user_prompt = self.prompts.user_prompt(&now, &event_context, &intent);

        let reply = self
            .responder
            .respond(self.prompts.system_prompt(), &user_prompt)
            .await?;
        Ok(ChatResult::new(reply))
    }

    /// Today's and the next seven days' events, rendered for the prompt
    pub async fn event_context(&self, now: DateTime<Tz>) -> String {
        let today_window = day_range(&now, 0, self.tz);
        let upcoming_window = upcoming_7_days_range(&now, self.tz);

        let (today, upcoming) = tokio::join!(
            events_in_window(self.calendar.as_ref(), &today_window, self.tz),
            events_in_window(self.calendar.as_ref(), &upcoming_window, self.tz),
        );
        debug!(
            "Found {} events today and {} in the next 7 days",
            today.len(),
            upcoming.len()
        );

        build_event_context(&today, &upcoming)
    }
}
