//! Session state for a running front-end.
//!
//! A [`Session`] owns the store handle and everything the front-end used to
//! keep in globals: the active task, and how many events of the day were
//! last exported. It is driven from a single thread, one user action at a
//! time; no call blocks waiting on another.

use crate::activity_log::ActivityLog;
use crate::error::{Error, Result};
use crate::logbook::LogStore;
use crate::logbook::models::normalize_label;
use crate::report::{build_report, render_tsv, start_of_day, ReportRow};
use crate::traits::ClipboardSink;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

/// Snapshot for the elapsed-time display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Active task label, empty if nothing was ever recorded.
    pub label: String,
    /// Time since the active task was recorded.
    pub elapsed: Option<Duration>,
}

/// Result of an export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Rows in today's report.
    pub rows: Vec<ReportRow>,
    /// The rendered table.
    pub tsv: String,
    /// Rows placed on the clipboard: all of them, or 0 if it was unavailable.
    pub copied: usize,
    /// Why the clipboard could not be used, if it could not.
    pub clipboard_error: Option<String>,
}

/// A front-end session over a log store.
#[derive(Debug)]
pub struct Session<S: LogStore> {
    store: S,
    current: Option<String>,
    exported: usize,
    activity: ActivityLog,
}

impl<S: LogStore> Session<S> {
    /// Start a session, loading the active task from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn open(store: S, activity: ActivityLog) -> Result<Self> {
        let current = store.latest_task_label()?;
        Ok(Self { store, current, exported: 0, activity })
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The active task label, or `""` before anything was recorded.
    pub fn current_task(&self) -> &str {
        self.current.as_deref().unwrap_or_default()
    }

    /// Submit task text at the current time. See [`Session::submit_at`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn submit(&mut self, text: &str) -> Result<bool> {
        self.submit_at(text, Utc::now())
    }

    /// Submit task text entered at `at`.
    ///
    /// Empty text and text naming the active task (ignoring case) are
    /// ignored, so the log never holds two adjacent events for one task.
    /// Returns whether an event was recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn submit_at(&mut self, text: &str, at: DateTime<Utc>) -> Result<bool> {
        let Some(label) = normalize_label(text) else {
            return Ok(false);
        };
        if self.current.as_deref().is_some_and(|current| same_task(current, label)) {
            return Ok(false);
        }

        let event = self.store.record_task_at(label, at)?;
        self.activity.log("record", json!({ "label": event.label, "event_id": event.id }));
        self.current = Some(event.label);
        Ok(true)
    }

    /// Autocomplete suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn suggestions(&self) -> Result<Vec<String>> {
        self.store.known_task_labels()
    }

    /// Re-read the latest event and compute the elapsed time at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<Status> {
        let latest = self.store.latest_event()?;
        let elapsed = latest.as_ref().map(|event| (now - event.timestamp).max(Duration::zero()));
        self.current = latest.map(|event| event.label);
        Ok(Status { label: self.current_task().to_string(), elapsed })
    }

    /// Today's timesheet rows, closed at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn report<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> Result<Vec<ReportRow>>
    where
        Tz::Offset: std::fmt::Display,
    {
        let events = self.store.events_since(start_of_day(now, tz))?;
        Ok(build_report(&events, now, tz))
    }

    /// Build today's report and hand the table to `clipboard`.
    ///
    /// An unavailable clipboard does not fail the export; it is reported as
    /// zero rows copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read, or if the clipboard
    /// fails for a reason other than being unavailable.
    pub fn export<Tz: TimeZone>(
        &mut self,
        clipboard: &dyn ClipboardSink,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<ExportOutcome>
    where
        Tz::Offset: std::fmt::Display,
    {
        let rows = self.report(now, tz)?;
        let tsv = render_tsv(&rows);

        let (copied, clipboard_error) = match clipboard.copy(&tsv) {
            Ok(()) => (rows.len(), None),
            Err(Error::ClipboardUnavailable(reason)) => (0, Some(reason)),
            Err(e) => return Err(e),
        };
        if clipboard_error.is_none() {
            self.exported = copied;
        }

        self.activity.log("export", json!({ "rows": rows.len(), "copied": copied }));
        Ok(ExportOutcome { rows, tsv, copied, clipboard_error })
    }

    /// Events recorded today.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn events_today<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> Result<usize> {
        self.store.count_events_since(start_of_day(now, tz))
    }

    /// Events covered by the last successful export.
    pub const fn exported_count(&self) -> usize {
        self.exported
    }

    /// Whether closing should be confirmed: today's events differ from
    /// what was last exported.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn needs_close_confirmation<Tz: TimeZone>(
        &self,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<bool> {
        Ok(self.events_today(now, tz)? != self.exported)
    }
}

fn same_task(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Format an elapsed duration as `H:MM:SS`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

const MAX_TICK_SECS: u64 = 24 * 60 * 60;

/// Schedules the recurring elapsed-time refresh on the session's thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    interval: Duration,
    next_due: DateTime<Utc>,
}

impl Ticker {
    /// A ticker first due at `start`, then every `interval_secs` seconds.
    ///
    /// The interval is clamped to between one second and one day.
    #[must_use]
    pub fn new(interval_secs: u64, start: DateTime<Utc>) -> Self {
        let secs = i64::try_from(interval_secs.clamp(1, MAX_TICK_SECS)).unwrap_or(1);
        Self { interval: Duration::seconds(secs), next_due: start }
    }

    /// When the next refresh is due.
    pub const fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// How long until the next refresh, zero if already due.
    pub fn wait_time(&self, now: DateTime<Utc>) -> Duration {
        (self.next_due - now).max(Duration::zero())
    }

    /// Returns true if a refresh is due at `now`, and schedules the next one.
    ///
    /// Missed ticks are not replayed; the next tick is one interval after `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logbook::SqliteLogStore;
    use crate::testing::{MemoryClipboard, NoClipboard};
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn new_session() -> Session<SqliteLogStore> {
        Session::open(SqliteLogStore::open_in_memory().unwrap(), ActivityLog::disabled()).unwrap()
    }

    #[test]
    fn test_repeated_submission_is_coalesced() {
        let mut session = new_session();
        assert!(session.submit_at("a", at(9, 0)).unwrap());
        assert!(!session.submit_at("a", at(9, 5)).unwrap());
        assert!(session.submit_at("b", at(9, 10)).unwrap());

        assert_eq!(session.store().count_events_since(at(0, 0)).unwrap(), 2);
    }

    #[test]
    fn test_coalescing_ignores_case_and_whitespace() {
        let mut session = new_session();
        session.submit_at("Code", at(9, 0)).unwrap();
        assert!(!session.submit_at("  code ", at(9, 1)).unwrap());
        assert_eq!(session.current_task(), "Code");
    }

    #[test]
    fn test_empty_submission_ignored() {
        let mut session = new_session();
        assert!(!session.submit_at("   ", at(9, 0)).unwrap());
        assert_eq!(session.current_task(), "");
    }

    #[test]
    fn test_returning_to_earlier_task_records_event() {
        let mut session = new_session();
        session.submit_at("a", at(9, 0)).unwrap();
        session.submit_at("b", at(9, 10)).unwrap();
        assert!(session.submit_at("a", at(9, 20)).unwrap());
        assert_eq!(session.suggestions().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_open_loads_current_task() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.sqlite3");
        {
            let store = SqliteLogStore::open(&path).unwrap();
            store.record_task_at("carry over", at(9, 0)).unwrap();
        }
        let mut session =
            Session::open(SqliteLogStore::open(&path).unwrap(), ActivityLog::disabled()).unwrap();
        assert_eq!(session.current_task(), "carry over");
        assert!(!session.submit_at("carry over", at(9, 30)).unwrap());
    }

    #[test]
    fn test_refresh_reports_elapsed() {
        let mut session = new_session();
        assert_eq!(
            session.refresh(at(9, 0)).unwrap(),
            Status { label: String::new(), elapsed: None }
        );

        session.submit_at("design", at(9, 0)).unwrap();
        let status = session.refresh(at(9, 42)).unwrap();
        assert_eq!(status.label, "design");
        assert_eq!(status.elapsed, Some(Duration::minutes(42)));
    }

    #[test]
    fn test_refresh_picks_up_writes_from_store() {
        let mut session = new_session();
        session.submit_at("design", at(9, 0)).unwrap();
        session.store().record_task_at("elsewhere", at(9, 10)).unwrap();

        let status = session.refresh(at(9, 15)).unwrap();
        assert_eq!(status.label, "elsewhere");
        assert_eq!(status.elapsed, Some(Duration::minutes(5)));
    }

    #[test]
    fn test_report_scoped_to_today() {
        let mut session = new_session();
        session.submit_at("yesterday", at(9, 0) - Duration::days(1)).unwrap();
        session.submit_at("design", at(9, 0)).unwrap();
        session.submit_at("code", at(9, 40)).unwrap();
        session.submit_at("test", at(10, 15)).unwrap();

        let rows = session.report(at(10, 30), &Utc).unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["design", "code", "test"]);
    }

    #[test]
    fn test_export_copies_table() {
        let mut session = new_session();
        session.submit_at("design", at(9, 0)).unwrap();
        session.submit_at("code", at(9, 40)).unwrap();

        let clipboard = MemoryClipboard::new();
        let outcome = session.export(&clipboard, at(10, 0), &Utc).unwrap();

        assert_eq!(outcome.copied, 2);
        assert!(outcome.clipboard_error.is_none());
        assert_eq!(clipboard.last().as_deref(), Some(outcome.tsv.as_str()));
        assert!(outcome.tsv.starts_with("day\tstarttime\tendtime\tdelta\ttodo\r\n"));
        assert_eq!(session.exported_count(), 2);
    }

    #[test]
    fn test_export_without_clipboard_copies_nothing() {
        let mut session = new_session();
        session.submit_at("design", at(9, 0)).unwrap();

        let outcome = session.export(&NoClipboard, at(10, 0), &Utc).unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.copied, 0);
        assert!(outcome.clipboard_error.is_some());
        assert_eq!(session.exported_count(), 0);
    }

    #[test]
    fn test_close_confirmation() {
        let mut session = new_session();
        assert!(!session.needs_close_confirmation(at(9, 0), &Utc).unwrap());

        session.submit_at("design", at(9, 0)).unwrap();
        assert!(session.needs_close_confirmation(at(9, 30), &Utc).unwrap());

        session.export(&MemoryClipboard::new(), at(9, 30), &Utc).unwrap();
        assert!(!session.needs_close_confirmation(at(9, 31), &Utc).unwrap());

        session.submit_at("code", at(9, 45)).unwrap();
        assert!(session.needs_close_confirmation(at(9, 50), &Utc).unwrap());
    }

    #[test]
    fn test_export_logs_activity() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::open(
            SqliteLogStore::open_in_memory().unwrap(),
            ActivityLog::new(dir.path(), true),
        )
        .unwrap();
        session.submit_at("design", at(9, 0)).unwrap();
        session.export(&MemoryClipboard::new(), at(9, 30), &Utc).unwrap();

        let log = std::fs::read_to_string(dir.path().join(crate::paths::ACTIVITY_LOG_FILENAME))
            .unwrap();
        let actions: Vec<String> = log
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["action"].to_string())
            .collect();
        assert_eq!(actions, vec!["\"record\"", "\"export\""]);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::seconds(0)), "0:00:00");
        assert_eq!(format_elapsed(Duration::seconds(3725)), "1:02:05");
        assert_eq!(format_elapsed(Duration::hours(27)), "27:00:00");
        assert_eq!(format_elapsed(Duration::seconds(-5)), "0:00:00");
    }

    #[test]
    fn test_ticker_fires_on_interval() {
        let start = at(9, 0);
        let mut ticker = Ticker::new(10, start);

        assert!(ticker.poll(start));
        assert!(!ticker.poll(start + Duration::seconds(5)));
        assert_eq!(ticker.wait_time(start + Duration::seconds(5)), Duration::seconds(5));
        assert!(ticker.poll(start + Duration::seconds(10)));
        assert_eq!(ticker.next_due(), start + Duration::seconds(20));
    }

    #[test]
    fn test_ticker_skips_missed_ticks() {
        let start = at(9, 0);
        let mut ticker = Ticker::new(10, start);
        ticker.poll(start);

        let late = start + Duration::seconds(95);
        assert!(ticker.poll(late));
        assert!(!ticker.poll(late + Duration::seconds(1)));
        assert_eq!(ticker.next_due(), late + Duration::seconds(10));
    }

    #[test]
    fn test_ticker_zero_interval_is_one_second() {
        let start = at(9, 0);
        let mut ticker = Ticker::new(0, start);
        ticker.poll(start);
        assert_eq!(ticker.next_due(), start + Duration::seconds(1));
    }
}
