//! Core business logic abstractions

pub mod config;
pub mod history;
pub mod log;
pub mod notify;
pub mod rate;
pub mod schedule;
pub mod store;

// Re-export main types for cleaner imports
pub use history::{HistoryBuffer, HistoryStore, Observation, Trend};
pub use notify::{Notification, Notifier};
pub use rate::{CurrencyPair, FetchError, RateProvider};
pub use schedule::ScheduleRule;
pub use store::KeyValueStore;
