use super::models::{EventTime, RawEvent};
use super::normalize::DEFAULT_TITLE;
use super::window::TimeWindow;
use super::{CalendarSource, REQUEST_TIMEOUT};
use crate::error::{feed_error, BotResult};
use crate::utils::time::{localize, midnight};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use ical::IcalParser;
use reqwest::Client;
use tracing::{debug, info};

/// Calendar source backed by an iCal feed over HTTP
pub struct IcalFeedSource {
    url: Option<String>,
    client: Client,
    tz: Tz,
}

impl IcalFeedSource {
    /// Create a feed source; without a URL it serves an empty calendar
    pub fn new(url: Option<String>, tz: Tz) -> BotResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { url, client, tz })
    }

    async fn fetch_feed(&self, url: &str) -> BotResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| feed_error(&format!("Failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(feed_error(&format!(
                "Failed to fetch feed: HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| feed_error(&format!("Failed to read feed body: {}", e)))
    }
}

#[async_trait]
impl CalendarSource for IcalFeedSource {
    fn name(&self) -> &'static str {
        "ical_feed"
    }

    async fn list_events_between(
        &self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> BotResult<Vec<RawEvent>> {
        let Some(url) = &self.url else {
            return Ok(Vec::new());
        };

        let body = self.fetch_feed(url).await?;
        let events = parse_feed(&body, self.tz)?;
        let window = TimeWindow::new(start, end);
        let selected = events_between(&events, &window);

        info!(
            "Feed returned {} events, {} start in the requested range",
            events.len(),
            selected.len()
        );
        Ok(selected)
    }
}

/// A VEVENT with its times resolved into the fixed zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: Option<String>,
    pub url: Option<String>,
}

impl FeedEvent {
    fn to_raw(&self) -> RawEvent {
        RawEvent {
            summary: Some(self.summary.clone()),
            start: Some(EventTime::date_time(self.start.to_rfc3339())),
            end: Some(EventTime::date_time(self.end.to_rfc3339())),
            location: self.location.clone(),
            link: self.url.clone(),
        }
    }
}

/// Feed events starting inside the window, as raw records
pub fn events_between(events: &[FeedEvent], window: &TimeWindow) -> Vec<RawEvent> {
    events
        .iter()
        .filter(|event| window.contains(&event.start))
        .map(FeedEvent::to_raw)
        .collect()
}

/// Parse every VEVENT of an iCalendar document
pub fn parse_feed(text: &str, tz: Tz) -> BotResult<Vec<FeedEvent>> {
    let mut events = Vec::new();

    for calendar in IcalParser::new(text.as_bytes()) {
        let calendar =
            calendar.map_err(|e| feed_error(&format!("Malformed calendar data: {}", e)))?;

        for event in &calendar.events {
            match parse_event(event, tz) {
                Some(parsed) => events.push(parsed),
                None => debug!("Skipping VEVENT without a usable DTSTART"),
            }
        }
    }

    Ok(events)
}

enum IcalTime {
    Date(NaiveDate),
    DateTime(DateTime<Tz>),
}

fn parse_event(event: &IcalEvent, tz: Tz) -> Option<FeedEvent> {
    let start = find_property(event, "DTSTART").and_then(|p| parse_time(p, tz))?;
    let start_instant = resolve(&start, tz)?;

    let end = match find_property(event, "DTEND").and_then(|p| parse_time(p, tz)) {
        Some(end) => resolve(&end, tz)?,
        None => match find_value(event, "DURATION").and_then(parse_duration) {
            Some(duration) => start_instant + duration,
            None => match start {
                IcalTime::Date(_) => start_instant + Duration::days(1),
                IcalTime::DateTime(_) => start_instant,
            },
        },
    };

    let summary = find_value(event, "SUMMARY")
        .map(unescape_text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Some(FeedEvent {
        summary,
        start: start_instant,
        end,
        location: find_value(event, "LOCATION")
            .map(unescape_text)
            .filter(|s| !s.trim().is_empty()),
        url: find_value(event, "URL").map(str::to_string),
    })
}

fn find_property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event
        .properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

fn find_value<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a str> {
    find_property(event, name)
        .and_then(|p| p.value.as_deref())
        .map(str::trim)
}

fn find_param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|v| v.trim_matches('"'))
}

fn parse_time(property: &Property, tz: Tz) -> Option<IcalTime> {
    let value = property.value.as_deref()?.trim();
    let is_date = find_param(property, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && !value.contains('T'));

    if is_date {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(IcalTime::Date);
    }

    if let Some(utc_value) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc_value, "%Y%m%dT%H%M%S").ok()?;
        return Some(IcalTime::DateTime(
            Utc.from_utc_datetime(&naive).with_timezone(&tz),
        ));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    // Unknown TZIDs (e.g. Windows zone names) are read as the fixed zone
    let source_tz = find_param(property, "TZID")
        .and_then(|id| id.parse::<Tz>().ok())
        .unwrap_or(tz);
    localize(&naive, source_tz)
        .map(|dt| dt.with_timezone(&tz))
        .map(IcalTime::DateTime)
}

fn resolve(time: &IcalTime, tz: Tz) -> Option<DateTime<Tz>> {
    match time {
        IcalTime::Date(date) => midnight(*date, tz),
        IcalTime::DateTime(dt) => Some(*dt),
    }
}

/// Parse an RFC 5545 duration such as `PT1H30M`, `P1D` or `-PT15M`
pub fn parse_duration(value: &str) -> Option<Duration> {
    let (negative, rest) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut number = String::new();
    let mut in_time = false;
    let mut seen_unit = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' if number.is_empty() => in_time = true,
            unit => {
                let n: i64 = number.parse().ok()?;
                number.clear();
                total += match (unit, in_time) {
                    ('W', false) => Duration::weeks(n),
                    ('D', false) => Duration::days(n),
                    ('H', true) => Duration::hours(n),
                    ('M', true) => Duration::minutes(n),
                    ('S', true) => Duration::seconds(n),
                    _ => return None,
                };
                seen_unit = true;
            }
        }
    }

    if !number.is_empty() || !seen_unit {
        return None;
    }
    Some(if negative { -total } else { total })
}

/// Undo iCalendar TEXT escaping
pub fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(',') => result.push(','),
            Some(';') => result.push(';'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}
