//! Local notification delivery.
//!
//! The core talks to the platform through the [`Notifier`] trait only. The
//! host application picks the implementation at startup:
//!
//! - [`IosNotifier`]: wraps an [`IosBridge`] to the iOS notification center
//! - [`AndroidNotifier`]: wraps an [`AndroidBridge`] to the Android scheduler
//! - [`RecordingNotifier`]: keeps everything in memory (tests, dry runs)

mod android;
mod ios;
mod recording;

pub use android::{AndroidBridge, AndroidLocalNotification, AndroidNotifier, AndroidPresentation};
pub use ios::{IosBridge, IosLocalNotification, IosNotifier, IosPresentation};
pub use recording::{NotifierCall, RecordingNotifier};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chorus::NotificationEvent;
use crate::error::NotifierError;

/// Correlation data attached to every notification so a tap (or a snooze
/// action) can be routed back to its alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmUserInfo {
    #[serde(rename = "alarmUUID")]
    pub alarm_uuid: Uuid,
}

/// Capability over the platform notification service.
///
/// Implementations must be shareable across threads; the scheduler
/// serializes calls per alarm but not globally.
pub trait Notifier: Send + Sync {
    /// Short platform name used in logs (e.g. "ios", "android").
    fn platform(&self) -> &str;

    /// Schedule exactly one local notification at `event.fire_instant`.
    fn schedule_local(&self, event: &NotificationEvent) -> Result<(), NotifierError>;

    /// Cancel every pending notification issued for `alarm_id`.
    fn cancel_all_for_alarm(&self, alarm_id: Uuid) -> Result<(), NotifierError>;

    /// Cancel every pending notification of the application.
    fn cancel_all(&self) -> Result<(), NotifierError>;

    /// Whether clearing one alarm should also run [`Notifier::cancel_all`].
    fn clears_broadly(&self) -> bool {
        false // per-alarm cancel is enough by default
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn platform(&self) -> &str {
        (**self).platform()
    }

    fn schedule_local(&self, event: &NotificationEvent) -> Result<(), NotifierError> {
        (**self).schedule_local(event)
    }

    fn cancel_all_for_alarm(&self, alarm_id: Uuid) -> Result<(), NotifierError> {
        (**self).cancel_all_for_alarm(alarm_id)
    }

    fn cancel_all(&self) -> Result<(), NotifierError> {
        (**self).cancel_all()
    }

    fn clears_broadly(&self) -> bool {
        (**self).clears_broadly()
    }
}
