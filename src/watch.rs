//! Reminder watch loop
//!
//! Polls the state snapshot on a tokio interval and reports reminders that
//! fell due since the previous poll.

use chrono::{Local, NaiveDateTime};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::reminders::{Reminder, ReminderBook};
use crate::state::StateStore;

/// Tracks the end of the last polled window
#[derive(Debug, Clone, Copy)]
pub struct ReminderWatcher {
    last: NaiveDateTime,
}

impl ReminderWatcher {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self { last: now }
    }

    /// Reminders due in `[last poll, now)`; clock jumps backwards yield nothing
    pub fn poll<'a>(&mut self, book: &'a ReminderBook, now: NaiveDateTime) -> Vec<&'a Reminder> {
        let due = book.due(self.last, now);
        if now > self.last {
            self.last = now;
        }
        due
    }
}

/// Poll every `every` until `shutdown` completes; returns the number of polls
///
/// The snapshot is re-read on each tick so reminders added by other
/// invocations are picked up.
pub async fn run<F>(
    store: &StateStore,
    config: &Config,
    every: Duration,
    shutdown: F,
    mut on_due: impl FnMut(NaiveDateTime, &Reminder),
) -> usize
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(every);
    let mut watcher = ReminderWatcher::starting_at(Local::now().naive_local());
    let mut polls = 0;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Local::now().naive_local();
                let state = store.load_or_fresh(config);
                let due = watcher.poll(&state.reminders, now);
                debug!(count = due.len(), "reminder poll");
                for reminder in due {
                    on_due(now, reminder);
                }
                polls += 1;
            }
            _ = &mut shutdown => break,
        }
    }
    polls
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_poll_reports_each_reminder_once() {
        let mut book = ReminderBook::default();
        book.add_medication("Fluoride", "08:00", at(7, 0)).unwrap();

        let mut watcher = ReminderWatcher::starting_at(at(7, 55));
        assert_eq!(watcher.poll(&book, at(8, 0)).len(), 0);
        assert_eq!(watcher.poll(&book, at(8, 1)).len(), 1);
        assert_eq!(watcher.poll(&book, at(8, 2)).len(), 0);
    }

    #[test]
    fn test_poll_ignores_clock_going_back() {
        let mut book = ReminderBook::default();
        book.add_medication("Fluoride", "08:00", at(7, 0)).unwrap();

        let mut watcher = ReminderWatcher::starting_at(at(9, 0));
        assert!(watcher.poll(&book, at(7, 0)).is_empty());
        assert_eq!(watcher.last, at(9, 0));
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::in_dir(dir.path());
        let config = Config::default();

        let polls = tokio_test::block_on(async {
            let shutdown = tokio::time::sleep(Duration::from_millis(45));
            run(&store, &config, Duration::from_millis(10), shutdown, |_, _| {}).await
        });
        assert!(polls >= 1);
    }
}
