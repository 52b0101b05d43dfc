//! ICS output: one file per event category, fully regenerated on every run.
//! Events carry deterministic UIDs and DTSTAMPs so a consumer importing the
//! same data twice updates entries in place instead of duplicating them.

use calendar_core::{CalendarError, CalendarEvent};
use chrono::{NaiveDate, NaiveTime};
use icalendar::{Calendar, Component, Event, EventLike, Property};
use std::path::Path;

/// Events whose date falls inside the inclusive `[start, end]` window.
pub fn filter_window<'a>(
    events: &'a [CalendarEvent],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|ev| ev.date >= start && ev.date <= end)
        .collect()
}

/// Render the in-window events as an ICS calendar string.
pub fn render_calendar(events: &[&CalendarEvent]) -> String {
    let mut calendar = Calendar::new();
    for ev in events {
        // DTSTAMP derived from the event date keeps regeneration
        // byte-identical; the icalendar crate would otherwise stamp "now".
        let stamp = ev.date.and_time(NaiveTime::MIN).and_utc();
        let mut ics_event = Event::new();
        ics_event
            .uid(&ev.uid())
            .summary(&ev.summary)
            .description(&ev.description)
            .all_day(ev.date)
            .timestamp(stamp)
            .append_property(Property::new("CATEGORIES", ev.category.label()));
        calendar.push(ics_event.done());
    }
    calendar.to_string()
}

/// Write the filtered calendar to `path`, replacing any previous file.
pub fn write_calendar(
    events: &[CalendarEvent],
    path: &Path,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<(), CalendarError> {
    let in_window = filter_window(events, window_start, window_end);
    tracing::info!(
        path = %path.display(),
        total = events.len(),
        in_window = in_window.len(),
        "writing calendar"
    );

    let rendered = render_calendar(&in_window);
    std::fs::write(path, rendered)
        .map_err(|e| CalendarError::Write(format!("{}: {}", path.display(), e)))
}
