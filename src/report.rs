//! Timesheet report generation.
//!
//! Events are interval boundaries: row *i* runs from event *i* to event
//! *i + 1* and carries the label of event *i*, the task that was active
//! during the interval. The last event is closed off at `now`. An empty
//! event list produces no rows.

use crate::logbook::Event;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Write;

/// Header row of the exported table.
pub const TSV_HEADER: &str = "day\tstarttime\tendtime\tdelta\ttodo";

/// Line terminator of the exported table.
pub const LINE_END: &str = "\r\n";

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// One interval of the timesheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Local date of the interval start.
    pub day: String,
    /// Local start time.
    pub start_time: String,
    /// Local end time.
    pub end_time: String,
    /// Elapsed hours.
    pub duration_hours: f64,
    /// Task active during the interval.
    pub label: String,
}

/// Build report rows from ascending events, closing the last one at `now`.
///
/// Day and time fields are rendered in `tz`; durations are elapsed UTC
/// seconds, so they are unaffected by offset changes inside an interval.
#[must_use]
pub fn build_report<Tz: TimeZone>(events: &[Event], now: DateTime<Utc>, tz: &Tz) -> Vec<ReportRow>
where
    Tz::Offset: std::fmt::Display,
{
    let ends = events.iter().skip(1).map(|event| event.timestamp).chain(std::iter::once(now));

    events.iter().zip(ends).map(|(event, end)| row(event.timestamp, end, &event.label, tz)).collect()
}

fn row<Tz: TimeZone>(start: DateTime<Utc>, end: DateTime<Utc>, label: &str, tz: &Tz) -> ReportRow
where
    Tz::Offset: std::fmt::Display,
{
    let local_start = start.with_timezone(tz);
    let local_end = end.with_timezone(tz);
    ReportRow {
        day: local_start.format(DAY_FORMAT).to_string(),
        start_time: local_start.format(TIME_FORMAT).to_string(),
        end_time: local_end.format(TIME_FORMAT).to_string(),
        duration_hours: elapsed_hours(start, end),
        label: label.to_string(),
    }
}

/// Hours between two instants; a backwards interval counts as zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let seconds = (end - start).num_milliseconds().max(0) as f64 / 1000.0;
    seconds / 3600.0
}

/// Render rows as a tab-separated table with a header, CRLF line endings.
#[must_use]
pub fn render_tsv(rows: &[ReportRow]) -> String {
    let mut out = String::with_capacity(TSV_HEADER.len() + rows.len() * 48);
    out.push_str(TSV_HEADER);
    out.push_str(LINE_END);
    for row in rows {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "{}\t{}\t{}\t{:.2}\t{}{LINE_END}",
            row.day,
            row.start_time,
            row.end_time,
            row.duration_hours,
            sanitize_cell(&row.label)
        );
    }
    out
}

fn sanitize_cell(text: &str) -> String {
    text.chars().map(|c| if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c }).collect()
}

/// The UTC instant of local midnight on the day containing `now` in `tz`.
///
/// When midnight does not exist locally (a DST gap), the earliest valid
/// instant of that day is used.
#[must_use]
pub fn start_of_day<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let date = now.with_timezone(tz).date_naive();
    let mut time = NaiveTime::MIN;
    for _ in 0..24 * 4 {
        if let Some(local) = tz.from_local_datetime(&date.and_time(time)).earliest() {
            return local.with_timezone(&Utc);
        }
        time += chrono::Duration::minutes(15);
    }
    now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn event(id: i64, timestamp: DateTime<Utc>, label: &str) -> Event {
        Event { id, timestamp, task_id: id, label: label.to_string() }
    }

    fn assert_hours(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 0.005, "expected ~{expected}h, got {actual}h");
    }

    #[test]
    fn test_empty_events_yield_no_rows() {
        assert!(build_report(&[], at(10, 30), &Utc).is_empty());
    }

    #[test]
    fn test_single_event_closed_at_now() {
        let t0 = at(9, 0);
        let now = t0 + Duration::seconds(90);
        let rows = build_report(&[event(1, t0, "build")], now, &Utc);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_time, "09:00:00");
        assert_eq!(rows[0].end_time, "09:01:30");
        assert!((rows[0].duration_hours - 0.025).abs() < 1e-9);
        assert_eq!(rows[0].label, "build");
    }

    #[test]
    fn test_label_comes_from_earlier_event() {
        let events =
            [event(1, at(9, 0), "design"), event(2, at(9, 40), "code"), event(3, at(10, 15), "test")];
        let rows = build_report(&events, at(10, 30), &Utc);

        assert_eq!(rows.len(), 3);

        assert_eq!((rows[0].start_time.as_str(), rows[0].end_time.as_str()), ("09:00:00", "09:40:00"));
        assert_hours(rows[0].duration_hours, 0.67);
        assert_eq!(rows[0].label, "design");

        assert_eq!((rows[1].start_time.as_str(), rows[1].end_time.as_str()), ("09:40:00", "10:15:00"));
        assert_hours(rows[1].duration_hours, 0.58);
        assert_eq!(rows[1].label, "code");

        assert_eq!((rows[2].start_time.as_str(), rows[2].end_time.as_str()), ("10:15:00", "10:30:00"));
        assert_hours(rows[2].duration_hours, 0.25);
        assert_eq!(rows[2].label, "test");
    }

    #[test]
    fn test_report_is_deterministic() {
        let events = [event(1, at(9, 0), "a"), event(2, at(9, 30), "b")];
        assert_eq!(build_report(&events, at(11, 0), &Utc), build_report(&events, at(11, 0), &Utc));
    }

    #[test]
    fn test_rows_rendered_in_local_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let rows = build_report(&[event(1, at(23, 0), "late")], at(23, 30), &tz);
        assert_eq!(rows[0].day, "2024-03-02");
        assert_eq!(rows[0].start_time, "01:00:00");
        assert_eq!(rows[0].end_time, "01:30:00");
        assert_hours(rows[0].duration_hours, 0.5);
    }

    #[test]
    fn test_now_before_last_event_clamps_to_zero() {
        let rows = build_report(&[event(1, at(10, 0), "x")], at(9, 0), &Utc);
        assert!(rows[0].duration_hours.abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_tsv_header_only_for_empty_report() {
        assert_eq!(render_tsv(&[]), "day\tstarttime\tendtime\tdelta\ttodo\r\n");
    }

    #[test]
    fn test_render_tsv_rows() {
        let events =
            [event(1, at(9, 0), "design"), event(2, at(9, 40), "code"), event(3, at(10, 15), "test")];
        let tsv = render_tsv(&build_report(&events, at(10, 30), &Utc));

        let expected = "day\tstarttime\tendtime\tdelta\ttodo\r\n\
                        2024-03-01\t09:00:00\t09:40:00\t0.67\tdesign\r\n\
                        2024-03-01\t09:40:00\t10:15:00\t0.58\tcode\r\n\
                        2024-03-01\t10:15:00\t10:30:00\t0.25\ttest\r\n";
        assert_eq!(tsv, expected);
    }

    #[test]
    fn test_render_tsv_sanitizes_labels() {
        let rows = build_report(&[event(1, at(9, 0), "a\tb\nc")], at(10, 0), &Utc);
        let tsv = render_tsv(&rows);
        assert!(tsv.ends_with("\ta b c\r\n"));
        assert_eq!(tsv.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_start_of_day_utc() {
        assert_eq!(start_of_day(at(10, 30), &Utc), at(0, 0));
    }

    #[test]
    fn test_start_of_day_with_offset() {
        // 23:00 UTC is already the next day at UTC+2
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = start_of_day(at(23, 0), &tz);
        assert_eq!(start, at(22, 0));
    }

    #[test]
    fn test_elapsed_hours() {
        assert_hours(elapsed_hours(at(9, 0), at(10, 30)), 1.5);
        assert!(elapsed_hours(at(10, 0), at(9, 0)).abs() < f64::EPSILON);
    }
}
