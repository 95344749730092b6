use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bird::Bird;
use crate::error::ValidationError;

/// Configured daily fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmTime {
    pub hour: u8,
    pub minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Reject times outside `00:00..=23:59`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hour > 23 || self.minute > 59 {
            return Err(ValidationError::InvalidAlarmTime {
                hour: self.hour,
                minute: self.minute,
            });
        }
        Ok(())
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One position in an alarm's chorus.
///
/// Serialized as the bird object, or `null` for an empty slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Bird>", into = "Option<Bird>")]
pub enum ChorusSlot {
    Filled(Bird),
    Empty,
}

impl ChorusSlot {
    pub fn bird(&self) -> Option<&Bird> {
        match self {
            ChorusSlot::Filled(bird) => Some(bird),
            ChorusSlot::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChorusSlot::Empty)
    }
}

impl From<Option<Bird>> for ChorusSlot {
    fn from(bird: Option<Bird>) -> Self {
        match bird {
            Some(bird) => ChorusSlot::Filled(bird),
            None => ChorusSlot::Empty,
        }
    }
}

impl From<ChorusSlot> for Option<Bird> {
    fn from(slot: ChorusSlot) -> Self {
        match slot {
            ChorusSlot::Filled(bird) => Some(bird),
            ChorusSlot::Empty => None,
        }
    }
}

impl From<Bird> for ChorusSlot {
    fn from(bird: Bird) -> Self {
        ChorusSlot::Filled(bird)
    }
}

/// Identifier of one issued local notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(pub String);

impl NotificationHandle {
    pub fn for_event(alarm_id: Uuid, message_index: usize) -> Self {
        Self(format!("{alarm_id}:{message_index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user alarm as held by the host application's store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub uuid: Uuid,
    pub time: AlarmTime,
    pub chorus: Vec<ChorusSlot>,
    /// Handles issued by the most recent schedule call; empty after a clear.
    #[serde(default)]
    pub notifications: Vec<NotificationHandle>,
}

impl Alarm {
    /// Create an alarm with a fresh UUID and no scheduled notifications.
    pub fn new(time: AlarmTime, chorus: Vec<ChorusSlot>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            time,
            chorus,
            notifications: Vec::new(),
        }
    }

    /// Number of slots that hold a bird.
    pub fn bird_count(&self) -> usize {
        self.chorus.iter().filter(|slot| !slot.is_empty()).count()
    }

    pub fn has_active_schedule(&self) -> bool {
        !self.notifications.is_empty()
    }

    /// Copy of this alarm recording the given notification handles.
    pub fn with_notifications(&self, notifications: Vec<NotificationHandle>) -> Self {
        Self {
            notifications,
            ..self.clone()
        }
    }
}
