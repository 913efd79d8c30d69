//! Run lifecycle notifications.
//!
//! A run announces itself twice: when it starts and when it finishes. Delivery
//! is best effort; a notifier that fails must not affect the run.

use std::fmt;

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Info,
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Started,
    Finished,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Started => f.write_str("started"),
            Stage::Finished => f.write_str("finished"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEvent {
    pub stage: Stage,
    pub status: EventStatus,
    pub message: String,
}

pub trait Notifier {
    fn notify(&self, event: &RunEvent);
}

/// Default notifier: emits events through `tracing`.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &RunEvent) {
        match event.status {
            EventStatus::Info | EventStatus::Ok => info!("{}: {}", event.stage, event.message),
            EventStatus::Error => error!("{}: {}", event.stage, event.message),
        }
    }
}

/// Drops every event.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: &RunEvent) {}
}
