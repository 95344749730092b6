use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{AlarmUserInfo, Notifier};
use crate::chorus::NotificationEvent;
use crate::error::NotifierError;

/// Static presentation settings for Android notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidPresentation {
    #[serde(default = "default_small_icon")]
    pub small_icon: String,
    #[serde(default = "default_sub_text")]
    pub sub_text: String,
    #[serde(default)]
    pub vibrate: bool,
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,
    /// Also clear every pending notification when one alarm is cleared.
    #[serde(default = "default_true")]
    pub clear_all_on_cancel: bool,
}

fn default_small_icon() -> String {
    "ic_notification".into()
}
fn default_sub_text() -> String {
    "Tap to hear chorus".into()
}
fn default_actions() -> Vec<String> {
    vec!["Snooze".into(), "Stop".into()]
}
fn default_true() -> bool {
    true
}

impl Default for AndroidPresentation {
    fn default() -> Self {
        Self {
            small_icon: default_small_icon(),
            sub_text: default_sub_text(),
            vibrate: false,
            actions: default_actions(),
            clear_all_on_cancel: true,
        }
    }
}

/// Payload handed to the Android notification scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidLocalNotification {
    pub large_icon: String,
    pub small_icon: String,
    pub title: String,
    #[serde(rename = "alarmUUID")]
    pub alarm_uuid: Uuid,
    pub user_info: AlarmUserInfo,
    pub message: String,
    pub sub_text: String,
    pub date: DateTime<Utc>,
    pub sound_name: String,
    pub vibrate: bool,
    pub actions: Vec<String>,
}

impl AndroidLocalNotification {
    /// Build the payload, or `None` when the event has no bird.
    pub fn from_event(event: &NotificationEvent, presentation: &AndroidPresentation) -> Option<Self> {
        let bird = event.bird.as_ref()?;
        let message = event.body.clone()?;
        Some(Self {
            large_icon: bird.images.face.clone(),
            small_icon: presentation.small_icon.clone(),
            title: event.title.clone(),
            alarm_uuid: event.alarm_id,
            user_info: AlarmUserInfo {
                alarm_uuid: event.alarm_id,
            },
            message,
            sub_text: presentation.sub_text.clone(),
            date: event.fire_instant,
            sound_name: bird.sound.android_notification.clone(),
            vibrate: presentation.vibrate,
            actions: presentation.actions.clone(),
        })
    }
}

/// Host-side access to the Android notification scheduler.
pub trait AndroidBridge: Send + Sync {
    fn local_notification_schedule(
        &self,
        notification: &AndroidLocalNotification,
    ) -> Result<(), NotifierError>;

    /// Cancel pending notifications whose `alarmUUID` matches.
    fn cancel_local_notifications(&self, alarm_uuid: Uuid) -> Result<(), NotifierError>;

    fn clear_all_notifications(&self) -> Result<(), NotifierError>;
}

/// [`Notifier`] for Android.
pub struct AndroidNotifier<B> {
    bridge: B,
    presentation: AndroidPresentation,
}

impl<B: AndroidBridge> AndroidNotifier<B> {
    pub fn new(bridge: B) -> Self {
        Self::with_presentation(bridge, AndroidPresentation::default())
    }

    pub fn with_presentation(bridge: B, presentation: AndroidPresentation) -> Self {
        Self {
            bridge,
            presentation,
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }
}

impl<B: AndroidBridge> Notifier for AndroidNotifier<B> {
    fn platform(&self) -> &str {
        "android"
    }

    fn schedule_local(&self, event: &NotificationEvent) -> Result<(), NotifierError> {
        let Some(payload) = AndroidLocalNotification::from_event(event, &self.presentation) else {
            debug!(index = event.message_index, "no bird in slot, nothing to schedule");
            return Ok(());
        };
        self.bridge.local_notification_schedule(&payload)
    }

    fn cancel_all_for_alarm(&self, alarm_id: Uuid) -> Result<(), NotifierError> {
        self.bridge.cancel_local_notifications(alarm_id)
    }

    fn cancel_all(&self) -> Result<(), NotifierError> {
        self.bridge.clear_all_notifications()
    }

    fn clears_broadly(&self) -> bool {
        self.presentation.clear_all_on_cancel
    }
}
