use super::models::CalendarEvent;
use crate::utils::time::midnight;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Half-open time range `[start, end)` in the fixed zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    /// Whether an instant falls inside the window
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// The calendar day `offset_days` after the day of `now`, midnight to midnight.
///
/// `offset_days` 0 is today, 1 is tomorrow.
pub fn day_range(now: &DateTime<Tz>, offset_days: i64, tz: Tz) -> TimeWindow {
    let today = now.with_timezone(&tz).date_naive();
    let day = today + Duration::days(offset_days);
    let next_day = day + Duration::days(1);

    // A zone without midnight on a given date falls back to the following hour
    let start = midnight(day, tz).unwrap_or_else(|| now.with_timezone(&tz));
    let end = midnight(next_day, tz).unwrap_or_else(|| start + Duration::days(1));
    TimeWindow::new(start, end)
}

/// From `now` up to seven days later
pub fn upcoming_7_days_range(now: &DateTime<Tz>, tz: Tz) -> TimeWindow {
    let start = now.with_timezone(&tz);
    TimeWindow::new(start, start + Duration::days(7))
}

/// Events whose start lies in the window.
///
/// Only the start counts: an event that began before the window but is still
/// running inside it is left out.
pub fn filter_events(events: &[CalendarEvent], window: &TimeWindow) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|event| window.contains(&event.start))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    fn event(title: &str, start: DateTime<Tz>, end: DateTime<Tz>) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            start,
            end,
            location: None,
            link: None,
        }
    }

    fn ist(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Kolkata.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_day_range_today_and_tomorrow() {
        let now = ist(2026, 1, 3, 8, 0);

        let today = day_range(&now, 0, Kolkata);
        assert_eq!(today.start, ist(2026, 1, 3, 0, 0));
        assert_eq!(today.end, ist(2026, 1, 4, 0, 0));

        let tomorrow = day_range(&now, 1, Kolkata);
        assert_eq!(tomorrow.start, ist(2026, 1, 4, 0, 0));
        assert_eq!(tomorrow.end, ist(2026, 1, 5, 0, 0));
    }

    #[test]
    fn test_day_range_uses_target_zone_date() {
        // 20:00 UTC on the 2nd is already the 3rd in IST
        let now = chrono::Utc
            .with_ymd_and_hms(2026, 1, 2, 20, 0, 0)
            .unwrap()
            .with_timezone(&Kolkata);
        let today = day_range(&now, 0, Kolkata);
        assert_eq!(today.start, ist(2026, 1, 3, 0, 0));
    }

    #[test]
    fn test_upcoming_range() {
        let now = ist(2026, 1, 3, 8, 0);
        let window = upcoming_7_days_range(&now, Kolkata);
        assert_eq!(window.start, now);
        assert_eq!(window.end, ist(2026, 1, 10, 8, 0));
    }

    #[test]
    fn test_membership_is_start_only() {
        let today = day_range(&ist(2026, 1, 3, 8, 0), 0, Kolkata);

        let events = vec![
            event("At midnight", ist(2026, 1, 3, 0, 0), ist(2026, 1, 3, 1, 0)),
            event("Overnight", ist(2026, 1, 2, 22, 0), ist(2026, 1, 3, 2, 0)),
            event("Runs late", ist(2026, 1, 3, 23, 0), ist(2026, 1, 4, 3, 0)),
            event("Next midnight", ist(2026, 1, 4, 0, 0), ist(2026, 1, 4, 1, 0)),
        ];

        let titles: Vec<_> = filter_events(&events, &today)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["At midnight", "Runs late"]);
    }

    #[test]
    fn test_upcoming_excludes_earlier_today() {
        let now = ist(2026, 1, 3, 8, 0);
        let window = upcoming_7_days_range(&now, Kolkata);

        let events = vec![
            event("Breakfast", ist(2026, 1, 3, 7, 0), ist(2026, 1, 3, 9, 0)),
            event("Meeting", ist(2026, 1, 3, 10, 0), ist(2026, 1, 3, 11, 0)),
            event("Week later", ist(2026, 1, 10, 8, 0), ist(2026, 1, 10, 9, 0)),
        ];

        let filtered = filter_events(&events, &window);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Meeting");
    }
}
