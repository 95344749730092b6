//! Console stand-in for a phone's notification service.
//!
//! Implements both platform bridges by recording what the device would have
//! been asked to do, so commands can print it as JSON.

use std::sync::{Arc, Mutex, PoisonError};

use dawnchorus_core::notifier::{AndroidLocalNotification, IosLocalNotification};
use dawnchorus_core::{AndroidBridge, IosBridge, NotifierError};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeviceOp {
    IosSchedule {
        identifier: String,
        notification: IosLocalNotification,
    },
    IosCancel {
        identifier: String,
    },
    IosCancelAll,
    AndroidSchedule {
        notification: AndroidLocalNotification,
    },
    AndroidCancel {
        alarm_uuid: Uuid,
    },
    AndroidClearAll,
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleDevice {
    ops: Arc<Mutex<Vec<DeviceOp>>>,
}

impl ConsoleDevice {
    fn record(&self, op: DeviceOp) -> Result<(), NotifierError> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
        Ok(())
    }

    pub fn ops(&self) -> Vec<DeviceOp> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl IosBridge for ConsoleDevice {
    fn local_notification(
        &self,
        notification: &IosLocalNotification,
        identifier: &str,
    ) -> Result<(), NotifierError> {
        self.record(DeviceOp::IosSchedule {
            identifier: identifier.to_string(),
            notification: notification.clone(),
        })
    }

    fn cancel_local_notification(&self, identifier: &str) -> Result<(), NotifierError> {
        self.record(DeviceOp::IosCancel {
            identifier: identifier.to_string(),
        })
    }

    fn cancel_all_local_notifications(&self) -> Result<(), NotifierError> {
        self.record(DeviceOp::IosCancelAll)
    }
}

impl AndroidBridge for ConsoleDevice {
    fn local_notification_schedule(
        &self,
        notification: &AndroidLocalNotification,
    ) -> Result<(), NotifierError> {
        self.record(DeviceOp::AndroidSchedule {
            notification: notification.clone(),
        })
    }

    fn cancel_local_notifications(&self, alarm_uuid: Uuid) -> Result<(), NotifierError> {
        self.record(DeviceOp::AndroidCancel { alarm_uuid })
    }

    fn clear_all_notifications(&self) -> Result<(), NotifierError> {
        self.record(DeviceOp::AndroidClearAll)
    }
}
