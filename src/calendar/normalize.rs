use super::models::{CalendarEvent, RawEvent};
use crate::utils::time::parse_event_timestamp;
use chrono_tz::Tz;
use tracing::debug;

/// Title used when a record has no summary
pub const DEFAULT_TITLE: &str = "Event";

/// Convert raw records into events in the target zone.
///
/// Records without a start or an end, or with timestamps that cannot be
/// parsed, are skipped. Input order is kept.
pub fn normalize_events(raw_events: &[RawEvent], tz: Tz) -> Vec<CalendarEvent> {
    raw_events
        .iter()
        .filter_map(|raw| normalize_event(raw, tz))
        .collect()
}

/// Convert a single raw record, `None` when it has to be skipped
pub fn normalize_event(raw: &RawEvent, tz: Tz) -> Option<CalendarEvent> {
    let start_raw = raw.start.as_ref().and_then(|s| s.value())?;
    let end_raw = raw.end.as_ref().and_then(|e| e.value())?;

    let (Some(start), Some(end)) = (
        parse_event_timestamp(start_raw, tz),
        parse_event_timestamp(end_raw, tz),
    ) else {
        debug!(
            "Skipping event {:?} with unparseable times: {} / {}",
            raw.summary, start_raw, end_raw
        );
        return None;
    };

    let title = raw
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    Some(CalendarEvent {
        title,
        start,
        end,
        location: raw.location.clone(),
        link: raw.link.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::models::EventTime;
    use chrono_tz::Asia::Kolkata;

    fn raw(summary: Option<&str>, start: Option<EventTime>, end: Option<EventTime>) -> RawEvent {
        RawEvent {
            summary: summary.map(str::to_string),
            start,
            end,
            ..Default::default()
        }
    }

    #[test]
    fn test_drops_records_without_start_or_end() {
        let events = vec![
            raw(Some("No times"), None, None),
            raw(Some("No end"), Some(EventTime::date_time("2026-01-03T10:00:00")), None),
            raw(Some("No start"), None, Some(EventTime::date_time("2026-01-03T10:00:00"))),
            raw(
                Some("Empty values"),
                Some(EventTime::default()),
                Some(EventTime::date_time("")),
            ),
            raw(
                Some("Kept"),
                Some(EventTime::date_time("2026-01-03T10:00:00")),
                Some(EventTime::date_time("2026-01-03T11:00:00")),
            ),
        ];

        let normalized = normalize_events(&events, Kolkata);
        assert!(normalized.len() <= events.len());
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].title, "Kept");
    }

    #[test]
    fn test_converts_into_target_zone() {
        let events = vec![raw(
            Some("Meeting"),
            Some(EventTime::date_time("2026-01-03T04:30:00Z")),
            Some(EventTime::date_time("2026-01-03T11:00:00")),
        )];

        let normalized = normalize_events(&events, Kolkata);
        assert_eq!(normalized[0].start.timezone(), Kolkata);
        assert_eq!(normalized[0].end.timezone(), Kolkata);
        assert_eq!(normalized[0].start.format("%H:%M").to_string(), "10:00");
        assert_eq!(normalized[0].end.format("%H:%M").to_string(), "11:00");
    }

    #[test]
    fn test_date_time_wins_over_date() {
        let start = EventTime {
            date_time: Some("2026-01-03T09:00:00".to_string()),
            date: Some("2026-01-05".to_string()),
        };
        let events = vec![raw(None, Some(start), Some(EventTime::date("2026-01-04")))];

        let normalized = normalize_events(&events, Kolkata);
        assert_eq!(
            normalized[0].start.format("%Y-%m-%d %H:%M").to_string(),
            "2026-01-03 09:00"
        );
        assert_eq!(
            normalized[0].end.format("%Y-%m-%d %H:%M").to_string(),
            "2026-01-04 00:00"
        );
    }

    #[test]
    fn test_defaults_and_order() {
        let events = vec![
            raw(
                None,
                Some(EventTime::date("2026-01-05")),
                Some(EventTime::date("2026-01-06")),
            ),
            raw(
                Some("   "),
                Some(EventTime::date("2026-01-04")),
                Some(EventTime::date("2026-01-05")),
            ),
            RawEvent {
                summary: Some("Rally".to_string()),
                start: Some(EventTime::date("2026-01-03")),
                end: Some(EventTime::date("2026-01-04")),
                location: Some("Town hall".to_string()),
                link: Some("https://calendar.example/rally".to_string()),
            },
        ];

        let normalized = normalize_events(&events, Kolkata);
        let titles: Vec<_> = normalized.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Event", "Event", "Rally"]);
        assert_eq!(normalized[0].location, None);
        assert_eq!(normalized[2].location.as_deref(), Some("Town hall"));
        assert_eq!(
            normalized[2].link.as_deref(),
            Some("https://calendar.example/rally")
        );
    }

    #[test]
    fn test_skips_unparseable() {
        let events = vec![raw(
            Some("Broken"),
            Some(EventTime::date_time("sometime")),
            Some(EventTime::date_time("2026-01-03T11:00:00")),
        )];
        assert!(normalize_events(&events, Kolkata).is_empty());
    }
}
