use super::llm::{LanguageModel, RigModel};
use crate::config::LlmConfig;
use crate::error::{assistant_error, BotResult, Error};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Calls the language model under a timeout with bounded retries
#[derive(Clone)]
pub struct Responder {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
    max_retries: u32,
    base_backoff: Duration,
}

impl Responder {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            timeout: Duration::from_secs(30),
            max_retries: 1,
            base_backoff: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(Arc::new(RigModel::from_config(config)))
            .with_timeout(config.timeout)
            .with_max_retries(config.max_retries)
    }

    /// Timeout of a single attempt
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries after the first attempt
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    /// Get the trimmed model reply.
    ///
    /// Every failure (error, timeout, empty text) ends as `Error::Assistant`
    /// once the attempts are used up.
    pub async fn respond(&self, system_prompt: &str, user_prompt: &str) -> BotResult<String> {
        let attempts = self.max_retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            let outcome =
                tokio::time::timeout(self.timeout, self.model.complete(system_prompt, user_prompt))
                    .await;

            match outcome {
                Ok(Ok(text)) if !text.trim().is_empty() => return Ok(text.trim().to_string()),
                Ok(Ok(_)) => last_error = "model returned an empty response".to_string(),
                Ok(Err(Error::Assistant(message))) => last_error = message,
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = format!("model call timed out after {:?}", self.timeout),
            }

            warn!(attempt = attempt + 1, error = %last_error, "Language model call failed");
            if attempt + 1 < attempts {
                self.sleep_with_backoff(attempt + 1).await;
            }
        }

        error!("Giving up on the language model after {} attempts", attempts);
        Err(assistant_error(&last_error))
    }

    fn backoff_delay(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8);
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: u32) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
