use anyhow::Result;

use crate::domain::Notification;
use crate::storage::AppLog;

/// Where relayed notifications end up
pub trait NotificationSink: Send + 'static {
    fn deliver(&mut self, notification: &Notification) -> Result<()>;
}

impl<F> NotificationSink for F
where
    F: FnMut(&Notification) -> Result<()> + Send + 'static,
{
    fn deliver(&mut self, notification: &Notification) -> Result<()> {
        self(notification)
    }
}

/// Writes notifications to the application log
pub struct LogSink {
    log: AppLog,
}

impl LogSink {
    pub fn new(log: AppLog) -> Self {
        Self { log }
    }
}

impl NotificationSink for LogSink {
    fn deliver(&mut self, notification: &Notification) -> Result<()> {
        self.log.info(&format!(
            "notification: {}: {}",
            notification.title, notification.content
        ))
    }
}

/// Delivers every notification to each inner sink in turn.
///
/// All sinks are tried; the first error is reported.
pub struct FanOut {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: impl NotificationSink) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl Default for FanOut {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for FanOut {
    fn deliver(&mut self, notification: &Notification) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.deliver(notification) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
