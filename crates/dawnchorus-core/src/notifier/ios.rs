use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{AlarmUserInfo, Notifier};
use crate::chorus::NotificationEvent;
use crate::error::NotifierError;

/// Static presentation settings for iOS notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosPresentation {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_alert_action")]
    pub alert_action: String,
}

fn default_category() -> String {
    "ALARM".into()
}
fn default_alert_action() -> String {
    "Tap to hear chorus.".into()
}

impl Default for IosPresentation {
    fn default() -> Self {
        Self {
            category: default_category(),
            alert_action: default_alert_action(),
        }
    }
}

/// Payload handed to the iOS local notification API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosLocalNotification {
    pub alert_title: String,
    pub category: String,
    pub alert_body: String,
    pub alert_action: String,
    pub sound_name: String,
    /// ISO-8601 UTC with milliseconds.
    pub fire_date: String,
    pub user_info: AlarmUserInfo,
}

impl IosLocalNotification {
    /// Build the payload, or `None` when the event has no bird.
    pub fn from_event(event: &NotificationEvent, presentation: &IosPresentation) -> Option<Self> {
        let bird = event.bird.as_ref()?;
        let body = event.body.clone()?;
        Some(Self {
            alert_title: event.title.clone(),
            category: presentation.category.clone(),
            alert_body: body,
            alert_action: presentation.alert_action.clone(),
            sound_name: bird.sound.ios_notification.clone(),
            fire_date: event
                .fire_instant
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            user_info: AlarmUserInfo {
                alarm_uuid: event.alarm_id,
            },
        })
    }
}

/// Host-side access to the iOS notification center.
///
/// Notifications are registered under the alarm UUID string, so a single
/// cancel removes a whole window.
pub trait IosBridge: Send + Sync {
    fn local_notification(
        &self,
        notification: &IosLocalNotification,
        identifier: &str,
    ) -> Result<(), NotifierError>;

    fn cancel_local_notification(&self, identifier: &str) -> Result<(), NotifierError>;

    fn cancel_all_local_notifications(&self) -> Result<(), NotifierError>;
}

/// [`Notifier`] for iOS.
pub struct IosNotifier<B> {
    bridge: B,
    presentation: IosPresentation,
}

impl<B: IosBridge> IosNotifier<B> {
    pub fn new(bridge: B) -> Self {
        Self::with_presentation(bridge, IosPresentation::default())
    }

    pub fn with_presentation(bridge: B, presentation: IosPresentation) -> Self {
        Self {
            bridge,
            presentation,
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }
}

impl<B: IosBridge> Notifier for IosNotifier<B> {
    fn platform(&self) -> &str {
        "ios"
    }

    fn schedule_local(&self, event: &NotificationEvent) -> Result<(), NotifierError> {
        let Some(payload) = IosLocalNotification::from_event(event, &self.presentation) else {
            debug!(index = event.message_index, "no bird in slot, nothing to schedule");
            return Ok(());
        };
        self.bridge
            .local_notification(&payload, &event.alarm_id.to_string())
    }

    fn cancel_all_for_alarm(&self, alarm_id: Uuid) -> Result<(), NotifierError> {
        self.bridge.cancel_local_notification(&alarm_id.to_string())
    }

    fn cancel_all(&self) -> Result<(), NotifierError> {
        self.bridge.cancel_all_local_notifications()
    }
}
