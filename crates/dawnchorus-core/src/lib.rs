//! # Dawn Chorus Core Library
//!
//! Computes the staggered "dawn chorus" of wake-up notifications for an alarm
//! and issues or cancels them through a platform notification service.
//!
//! ## Architecture
//!
//! - **Model**: alarms, chorus slots and birds as the host application stores them
//! - **Chorus**: a pure function from an alarm and a window start to 15 timed
//!   notification events, 20 seconds apart, rotating through the chorus
//! - **Notifier**: the capability trait over the platform notification service,
//!   with iOS and Android adapters chosen by the host
//! - **Service**: places windows in time (next fire time, or snooze) and drives
//!   the notifier, serialized per alarm
//!
//! ## Key Components
//!
//! - [`AlarmScheduler`]: schedule, snooze and clear operations
//! - [`ChorusWindow`]: window timing and phrase list
//! - [`Notifier`]: platform notification capability
//! - [`Config`]: TOML configuration

pub mod chorus;
pub mod config;
pub mod error;
pub mod model;
pub mod notifier;
pub mod service;

pub use chorus::{compute_schedule, ChorusWindow, NotificationEvent};
pub use config::Config;
pub use error::{ConfigError, CoreError, NotifierError, ValidationError};
pub use model::{Alarm, AlarmTime, Bird, BirdImages, BirdSound, ChorusSlot, NotificationHandle};
pub use notifier::{
    AndroidBridge, AndroidNotifier, IosBridge, IosNotifier, Notifier, RecordingNotifier,
};
pub use service::{
    snooze_start, window_start, AlarmScheduler, DeliveryFailure, ScheduleReport, SnoozeOutcome,
    SnoozedTime,
};
