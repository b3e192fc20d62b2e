//! Manual sync request
//!
//! Checks that a sync can run and announces it through the notification
//! relay. The scheduler picks up the saved preferences on its next run.

use anyhow::Result;

use super::output::Output;
use crate::domain::Notification;
use crate::relay::{FanOut, LogSink, NotificationRelay, ShutdownMode, DEFAULT_CAPACITY};
use crate::storage::{LogLevel, Profile, ProfileError};
use crate::store;

pub fn run(profile: &Profile, output: &Output) -> Result<()> {
    let plan = match profile.sync_plan() {
        Ok(plan) => plan,
        Err(e) => {
            if let Some(blocked) = e.downcast_ref::<ProfileError>() {
                profile.log_event(LogLevel::Warn, &format!("sync not started: {}", blocked));
            }
            return Err(e);
        }
    };

    output.verbose_ctx(
        "sync",
        &format!("Ensuring sync directory {}", plan.directory.display()),
    );
    store::ensure_dir(&plan.directory)?;

    let mut sink = FanOut::new().with(LogSink::new(profile.log().clone()));
    if !output.is_json() {
        sink = sink.with(|n: &Notification| -> Result<()> {
            println!("{}: {}", n.title, n.content);
            Ok(())
        });
    }
    let relay = NotificationRelay::spawn(DEFAULT_CAPACITY, sink)?;

    relay.send(Notification::new(
        "Lominus",
        format!(
            "Sync requested. Files will be synced into {} every {}.",
            plan.directory.display(),
            plan.frequency
        ),
    ))?;
    if !profile.has_credentials() {
        relay.send(Notification::new(
            "Lominus",
            "No credentials saved yet. Run 'lominus credentials set' before the next sync.",
        ))?;
    }

    let stats = relay.shutdown(ShutdownMode::Drain)?;
    output.verbose_ctx(
        "sync",
        &format!(
            "Relayed {} notification(s), {} failed",
            stats.delivered, stats.failed
        ),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "requested": true,
            "directory": plan.directory.display().to_string(),
            "frequency": plan.frequency.hours(),
            "frequency_label": plan.frequency.label(),
            "notifications": stats,
        }));
    }

    Ok(())
}
