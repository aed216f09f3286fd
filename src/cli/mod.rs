pub mod convert;
pub mod history;
pub mod notifier;
pub mod refresh;
pub mod setup;
pub mod ui;
pub mod watch;
