//! Alarm and bird reference data as held by the host application's store.

mod alarm;
mod bird;

pub use alarm::{Alarm, AlarmTime, ChorusSlot, NotificationHandle};
pub use bird::{Bird, BirdImages, BirdSound};
