//! Trading sessions — intraday windows inside which entries are allowed.
//!
//! Defaults model a Tokyo cash-equity day: a morning session 09:00–11:30
//! and an afternoon session 12:30–15:15. A session change (including the
//! lunch break) force-closes open positions; entries are blocked in the
//! final minutes of each session.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// One intraday window, inclusive of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl SessionWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.open <= time && time <= self.close
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub windows: Vec<SessionWindow>,
    /// No new entries within this many minutes of a session close.
    pub entry_cutoff_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            windows: vec![
                SessionWindow {
                    open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    close: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
                },
                SessionWindow {
                    open: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
                    close: NaiveTime::from_hms_opt(15, 15, 0).unwrap(),
                },
            ],
            entry_cutoff_minutes: 5,
        }
    }
}

impl SessionConfig {
    /// Index of the session containing `ts`, or None outside all windows.
    pub fn session_index(&self, ts: NaiveDateTime) -> Option<usize> {
        let time = ts.time();
        self.windows.iter().position(|w| w.contains(time))
    }

    /// True when `ts` is inside a session and not within the entry cutoff
    /// of that session's close.
    pub fn can_enter(&self, ts: NaiveDateTime) -> bool {
        let Some(idx) = self.session_index(ts) else {
            return false;
        };
        let close = self.windows[idx].close;
        let cutoff_secs = self.entry_cutoff_minutes as u32 * 60;
        let remaining = close.num_seconds_from_midnight() as i64
            - ts.time().num_seconds_from_midnight() as i64;
        remaining > cutoff_secs as i64
    }
}
