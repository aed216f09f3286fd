use super::ui;
use crate::core::{Notification, Notifier};
use anyhow::Result;
use async_trait::async_trait;

/// Prints notifications to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        println!(
            "{} {}",
            ui::style_text(&notification.title, ui::StyleType::TotalLabel),
            notification.body
        );
        Ok(())
    }
}
