use crate::error::{config_error, env_error, BotResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Default timezone every event is rendered in
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
/// Default OpenAI-compatible endpoint (Groq)
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default chat model
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
/// Optional profile overrides
pub const PROFILE_FILE: &str = "config/profile.toml";

/// Which calendar backend answers `list_events_between`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarSourceKind {
    Ical,
    Google,
}

impl FromStr for CalendarSourceKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> BotResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ical" | "ics" => Ok(Self::Ical),
            "google" => Ok(Self::Google),
            other => Err(config_error(&format!("Unknown calendar source: {}", other))),
        }
    }
}

/// Where the OAuth token of the Google source is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStoreKind {
    File,
    Redis,
}

impl FromStr for TokenStoreKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> BotResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            other => Err(config_error(&format!("Unknown token store: {}", other))),
        }
    }
}

/// Language model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Any OpenAI-compatible chat completions API (Groq by default)
    OpenAi,
    Gemini,
}

impl FromStr for LlmProvider {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> BotResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "groq" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(config_error(&format!("Unknown LLM provider: {}", other))),
        }
    }
}

/// Calendar source settings
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub source: CalendarSourceKind,
    /// iCal feed URL; no URL means an empty calendar
    pub ical_url: Option<String>,
    /// Google Calendar ID to read
    pub google_calendar_id: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub token_store: TokenStoreKind,
    pub token_path: PathBuf,
    pub redis_url: String,
}

impl CalendarConfig {
    /// Load calendar settings from the environment and `.env`
    pub fn from_env() -> BotResult<Self> {
        dotenv().ok();
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    /// Build calendar settings from an arbitrary variable lookup
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> BotResult<Self> {
        let source = match non_empty(lookup("CALENDAR_SOURCE")) {
            Some(value) => value.parse()?,
            None => CalendarSourceKind::Ical,
        };
        let token_store = match non_empty(lookup("TOKEN_STORE")) {
            Some(value) => value.parse()?,
            None => TokenStoreKind::File,
        };

        let config = CalendarConfig {
            source,
            ical_url: non_empty(lookup("ICAL_URL")),
            google_calendar_id: non_empty(lookup("GOOGLE_CALENDAR_ID"))
                .unwrap_or_else(|| "primary".to_string()),
            google_client_id: non_empty(lookup("GOOGLE_CLIENT_ID")),
            google_client_secret: non_empty(lookup("GOOGLE_CLIENT_SECRET")),
            token_store,
            token_path: non_empty(lookup("TOKEN_PATH"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("token.json")),
            redis_url: non_empty(lookup("REDIS_URL"))
                .unwrap_or_else(|| "redis://127.0.0.1/".to_string()),
        };

        if config.source == CalendarSourceKind::Google {
            config.google_credentials()?;
        }

        Ok(config)
    }

    /// OAuth client id and secret, required by the Google source
    pub fn google_credentials(&self) -> BotResult<(String, String)> {
        let client_id = self
            .google_client_id
            .clone()
            .ok_or_else(|| env_error("GOOGLE_CLIENT_ID"))?;
        let client_secret = self
            .google_client_secret
            .clone()
            .ok_or_else(|| env_error("GOOGLE_CLIENT_SECRET"))?;
        Ok((client_id, client_secret))
    }
}

/// Language model settings
#[derive(Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    /// Base URL for the OpenAI-compatible provider
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    /// Timeout of a single attempt
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl LlmConfig {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> BotResult<Self> {
        let provider = match non_empty(lookup("LLM_PROVIDER")) {
            Some(value) => value.parse()?,
            None => LlmProvider::OpenAi,
        };

        let api_key = non_empty(lookup("LLM_API_KEY"))
            .or_else(|| non_empty(lookup("GROQ_API_KEY")))
            .ok_or_else(|| env_error("LLM_API_KEY"))?;

        let temperature = parse_or("LLM_TEMPERATURE", lookup("LLM_TEMPERATURE"), 0.2)?;
        let timeout_secs = parse_or("LLM_TIMEOUT_SECS", lookup("LLM_TIMEOUT_SECS"), 30u64)?;
        let max_retries = parse_or("LLM_MAX_RETRIES", lookup("LLM_MAX_RETRIES"), 1u32)?;

        Ok(LlmConfig {
            provider,
            api_key,
            base_url: non_empty(lookup("LLM_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: non_empty(lookup("LLM_MODEL")).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            temperature,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
        })
    }
}

/// Who the assistant speaks for, rendered verbatim into the system prompt
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssistantProfile {
    /// Name of the public figure whose calendar is served
    pub owner_name: String,
    /// Phone number given for appointments and office contact
    pub contact_number: String,
}

impl Default for AssistantProfile {
    fn default() -> Self {
        Self {
            owner_name: "Madhav".to_string(),
            contact_number: "9182565685".to_string(),
        }
    }
}

impl AssistantProfile {
    /// Read a profile file, falling back to defaults when it is absent or invalid
    pub fn from_file(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str::<AssistantProfile>(&content) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Ignoring invalid profile file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply environment overrides on top of this profile
    pub fn with_overrides(mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        if let Some(owner) = non_empty(lookup("ASSISTANT_OWNER")) {
            self.owner_name = owner;
        }
        if let Some(number) = non_empty(lookup("CONTACT_NUMBER")) {
            self.contact_number = number;
        }
        self
    }
}

/// Main configuration structure, read-only after startup
#[derive(Debug, Clone)]
pub struct Config {
    /// The single fixed timezone of the calendar
    pub timezone: Tz,
    pub calendar: CalendarConfig,
    pub llm: LlmConfig,
    pub profile: AssistantProfile,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let lookup = |key: &str| env::var(key).ok();
        let profile = AssistantProfile::from_file(Path::new(PROFILE_FILE)).with_overrides(&lookup);
        Self::from_lookup(&lookup, profile)
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(
        lookup: &dyn Fn(&str) -> Option<String>,
        profile: AssistantProfile,
    ) -> BotResult<Self> {
        let timezone_str =
            non_empty(lookup("TIMEZONE")).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone_str
            .parse()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", timezone_str)))?;

        Ok(Config {
            timezone,
            calendar: CalendarConfig::from_lookup(lookup)?,
            llm: LlmConfig::from_lookup(lookup)?,
            profile,
            host: non_empty(lookup("HOST")).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", lookup("PORT"), 8000u16)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> BotResult<T> {
    match non_empty(value) {
        Some(raw) => raw
            .parse()
            .map_err(|_| config_error(&format!("Invalid {} value: {}", key, raw))),
        None => Ok(default),
    }
}
