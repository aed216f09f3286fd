//! Periodic refresh driven by a weekday/hour calendar.
//!
//! Windows that pass while the process is not running are not made up for
//! later.

use crate::core::schedule::{ScheduleRule, Window};
use chrono::{Local, NaiveDateTime};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Source of the wall-clock time the run loop compares against the rule.
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct Scheduler {
    rule: ScheduleRule,
    last_fired: Option<Window>,
    clock: Clock,
}

impl Scheduler {
    pub fn new(rule: ScheduleRule) -> Self {
        Self::with_clock(rule, Box::new(|| Local::now().naive_local()))
    }

    pub fn with_clock(rule: ScheduleRule, clock: Clock) -> Self {
        Self {
            rule,
            last_fired: None,
            clock,
        }
    }

    pub fn rule(&self) -> &ScheduleRule {
        &self.rule
    }

    /// Returns true when `now` falls in a matching window that has not fired
    /// yet, and marks that window as fired.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        match self.rule.window_at(now) {
            Some(window) if self.last_fired != Some(window) => {
                self.last_fired = Some(window);
                true
            }
            _ => false,
        }
    }

    /// Polls the clock every `poll_interval` and awaits `on_fire`
    /// for each new window until `shutdown` resolves. A refresh in progress
    /// is allowed to finish before shutdown is observed.
    pub async fn run<F, Fut, S>(&mut self, poll_interval: Duration, mut on_fire: F, shutdown: S)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
        S: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        if let Some(next) = self.rule.next_window((self.clock)()) {
            info!("Next scheduled refresh at {}", next);
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopping");
                    return;
                }
                _ = interval.tick() => {
                    let now = (self.clock)();
                    if self.poll(now) {
                        info!("Scheduled refresh firing at {}", now);
                        on_fire().await;
                        if let Some(next) = self.rule.next_window(now) {
                            info!("Next scheduled refresh at {}", next);
                        }
                    } else {
                        debug!("No refresh due at {}", now);
                    }
                }
            }
        }
    }
}
