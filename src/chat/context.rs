use crate::calendar::CalendarEvent;

/// Placeholder for locations missing from the calendar
pub const NO_LOCATION: &str = "Location not specified";
/// Rendering of an empty event list
pub const NO_EVENTS: &str = "None";

/// Render one event as `YYYY-MM-DD | HH:MM–HH:MM | title | location`
pub fn format_event(event: &CalendarEvent) -> String {
    let location = event
        .location
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(NO_LOCATION);

    format!(
        "{} | {}\u{2013}{} | {} | {}",
        event.start.format("%Y-%m-%d"),
        event.start.format("%H:%M"),
        event.end.format("%H:%M"),
        event.title,
        location
    )
}

/// Render events one per line, or `None` when there are none
pub fn format_events(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS.to_string();
    }
    events
        .iter()
        .map(format_event)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full event context for the prompt: today's block and the seven-day block
pub fn build_event_context(today: &[CalendarEvent], upcoming: &[CalendarEvent]) -> String {
    format!(
        "TODAY_EVENTS:\n{}\n\nUPCOMING_7_DAYS_EVENTS:\n{}",
        format_events(today),
        format_events(upcoming)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    fn event(title: &str, day: u32, start_hour: u32, end_hour: u32, location: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            start: Kolkata.with_ymd_and_hms(2026, 1, day, start_hour, 0, 0).unwrap(),
            end: Kolkata.with_ymd_and_hms(2026, 1, day, end_hour, 30, 0).unwrap(),
            location: location.map(str::to_string),
            link: None,
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_events(&[]), "None");
    }

    #[test]
    fn test_line_format() {
        let events = vec![
            event("Meeting", 3, 10, 11, Some("Srikakulam")),
            event("Press meet", 4, 9, 9, None),
            event("Visit", 5, 14, 15, Some("  ")),
        ];

        let rendered = format_events(&events);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), events.len());
        assert_eq!(lines[0], "2026-01-03 | 10:00\u{2013}11:30 | Meeting | Srikakulam");
        assert_eq!(lines[1], "2026-01-04 | 09:00\u{2013}09:30 | Press meet | Location not specified");
        assert_eq!(lines[2], "2026-01-05 | 14:00\u{2013}15:30 | Visit | Location not specified");
    }

    #[test]
    fn test_event_context_layout() {
        let today = vec![event("Meeting", 3, 10, 11, Some("Srikakulam"))];
        let context = build_event_context(&today, &[]);
        assert_eq!(
            context,
            "TODAY_EVENTS:\n2026-01-03 | 10:00\u{2013}11:30 | Meeting | Srikakulam\n\nUPCOMING_7_DAYS_EVENTS:\nNone"
        );
    }
}
