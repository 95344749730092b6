use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use uuid::Uuid;

use super::Notifier;
use crate::chorus::NotificationEvent;
use crate::error::NotifierError;

/// One call received by a [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum NotifierCall {
    ScheduleLocal { event: NotificationEvent },
    CancelAllForAlarm { alarm_id: Uuid },
    CancelAll,
}

/// In-memory notifier that records every call.
///
/// Individual message indexes can be set to fail, which is how partial
/// delivery failures are exercised without a device.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    failing_indexes: HashSet<usize>,
    broad_clear: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave like a platform whose clear also cancels everything.
    pub fn with_broad_clear(mut self) -> Self {
        self.broad_clear = true;
        self
    }

    /// Reject `schedule_local` for the event at `message_index`.
    pub fn failing_at(mut self, message_index: usize) -> Self {
        self.failing_indexes.insert(message_index);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NotifierCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.lock().clone()
    }

    /// Events passed to `schedule_local`, in call order.
    pub fn scheduled(&self) -> Vec<NotificationEvent> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                NotifierCall::ScheduleLocal { event } => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn platform(&self) -> &str {
        "recording"
    }

    fn schedule_local(&self, event: &NotificationEvent) -> Result<(), NotifierError> {
        if self.failing_indexes.contains(&event.message_index) {
            return Err(NotifierError::Platform {
                platform: "recording".into(),
                message: format!("rejected event {}", event.message_index),
            });
        }
        self.lock().push(NotifierCall::ScheduleLocal {
            event: event.clone(),
        });
        Ok(())
    }

    fn cancel_all_for_alarm(&self, alarm_id: Uuid) -> Result<(), NotifierError> {
        self.lock().push(NotifierCall::CancelAllForAlarm { alarm_id });
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), NotifierError> {
        self.lock().push(NotifierCall::CancelAll);
        Ok(())
    }

    fn clears_broadly(&self) -> bool {
        self.broad_clear
    }
}
