//! Weekday/hour refresh calendar

use anyhow::{Result, bail};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use std::collections::BTreeSet;

/// Fires on the listed hours, Monday through Friday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRule {
    hours: BTreeSet<u32>,
}

/// One (date, hour) slot in which a refresh may fire once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Window {
    pub date: NaiveDate,
    pub hour: u32,
}

impl Window {
    pub fn start(&self) -> NaiveDateTime {
        // hour is always < 24, enforced by ScheduleRule::new
        self.date.and_time(NaiveTime::from_hms_opt(self.hour, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl ScheduleRule {
    pub fn new(hours: impl IntoIterator<Item = u32>) -> Result<Self> {
        let hours: BTreeSet<u32> = hours.into_iter().collect();
        if hours.is_empty() {
            bail!("Schedule needs at least one hour");
        }
        if let Some(bad) = hours.iter().find(|h| **h > 23) {
            bail!("Invalid schedule hour: {}", bad);
        }
        Ok(Self { hours })
    }

    pub fn hours(&self) -> impl Iterator<Item = u32> + '_ {
        self.hours.iter().copied()
    }

    pub fn is_active_day(weekday: Weekday) -> bool {
        !matches!(weekday, Weekday::Sat | Weekday::Sun)
    }

    /// The window `at` falls into, if it is a matching weekday and hour.
    pub fn window_at(&self, at: NaiveDateTime) -> Option<Window> {
        let hour = at.hour();
        (Self::is_active_day(at.weekday()) && self.hours.contains(&hour)).then_some(Window {
            date: at.date(),
            hour,
        })
    }

    /// Start of the first matching window strictly after `after`.
    pub fn next_window(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        // a full week always contains a weekday
        (0..8u64)
            .filter_map(|offset| after.date().checked_add_days(Days::new(offset)))
            .filter(|date| Self::is_active_day(date.weekday()))
            .flat_map(|date| self.hours.iter().map(move |&hour| Window { date, hour }))
            .map(|w| w.start())
            .find(|start| *start > after)
    }
}

impl Default for ScheduleRule {
    fn default() -> Self {
        Self {
            hours: BTreeSet::from([10, 12]),
        }
    }
}
