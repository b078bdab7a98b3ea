pub mod google;
pub mod ical_feed;
pub mod models;
pub mod normalize;
pub mod window;

pub use google::GoogleCalendarSource;
pub use ical_feed::IcalFeedSource;
pub use models::{CalendarEvent, EventTime, RawEvent};
pub use normalize::normalize_events;
pub use window::{day_range, filter_events, upcoming_7_days_range, TimeWindow};

use crate::config::{CalendarConfig, CalendarSourceKind};
use crate::error::BotResult;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on any single calendar HTTP request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Capability shared by every calendar backend
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Get the name of the source
    fn name(&self) -> &'static str;

    /// Raw records for events in `[start, end)`
    async fn list_events_between(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> BotResult<Vec<RawEvent>>;
}

/// Create the calendar source selected by configuration
pub fn build_source(config: &CalendarConfig, tz: Tz) -> BotResult<Arc<dyn CalendarSource>> {
    let source: Arc<dyn CalendarSource> = match config.source {
        CalendarSourceKind::Ical => {
            if config.ical_url.is_none() {
                warn!("ICAL_URL is not set; the calendar will always be empty");
            }
            Arc::new(IcalFeedSource::new(config.ical_url.clone(), tz)?)
        }
        CalendarSourceKind::Google => Arc::new(GoogleCalendarSource::from_config(config)?),
    };
    info!("Using calendar source: {}", source.name());
    Ok(source)
}

/// Normalized events starting inside the window.
///
/// A failing source yields no events.
pub async fn events_in_window(
    source: &dyn CalendarSource,
    window: &TimeWindow,
    tz: Tz,
) -> Vec<CalendarEvent> {
    let raw = match source.list_events_between(window.start, window.end).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                "Failed to list events from {} between {} and {}: {}",
                source.name(),
                window.start,
                window.end,
                e
            );
            return Vec::new();
        }
    };

    let events = filter_events(&normalize_events(&raw, tz), window);
    debug!(
        "{} of {} raw events from {} fall in the window",
        events.len(),
        raw.len(),
        source.name()
    );
    events
}
