use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Start or end of a raw event, either a timestamp or an all-day date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EventTime {
    pub fn date_time(value: impl Into<String>) -> Self {
        Self {
            date_time: Some(value.into()),
            date: None,
        }
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self {
            date_time: None,
            date: Some(value.into()),
        }
    }

    /// The value to parse: `dateTime` wins over `date`, empty strings are absent
    pub fn value(&self) -> Option<&str> {
        self.date_time
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.date.as_deref().filter(|v| !v.trim().is_empty()))
    }
}

/// Calendar record as returned by a calendar source, shaped like a Google
/// Calendar `events.list` item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "htmlLink", alias = "link", default)]
    pub link: Option<String>,
}

/// Normalized event in the fixed timezone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: Option<String>,
    pub link: Option<String>,
}
