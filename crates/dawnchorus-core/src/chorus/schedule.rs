//! Chorus schedule computation.
//!
//! Turns an alarm and a window start into the ordered list of notification
//! events for that window. Pure: no clock reads, no notifier calls.
//!
//! ## Rotation
//!
//! ```text
//! chorus = [A, B, _]   ->   A B A B A B ...
//! chorus = [A, _, C]   ->   A A A A ...
//! chorus = [_, A]      ->   _ A _ A ...
//! ```
//!
//! The cursor returns to the first slot as soon as it would step past the end
//! or onto an empty slot.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::window::ChorusWindow;
use crate::model::{Alarm, Bird, ChorusSlot, NotificationHandle};

/// One timed notification of a chorus window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub alarm_id: Uuid,
    pub fire_instant: DateTime<Utc>,
    /// `None` for an empty chorus slot; such events are never delivered.
    pub bird: Option<Bird>,
    /// Position in the window, also the phrase index.
    pub message_index: usize,
    pub title: String,
    pub body: Option<String>,
}

impl NotificationEvent {
    pub fn has_bird(&self) -> bool {
        self.bird.is_some()
    }

    pub fn handle(&self) -> NotificationHandle {
        NotificationHandle::for_event(self.alarm_id, self.message_index)
    }
}

/// Endless walk over a chorus following the wrap rule above.
///
/// Yields `None` for an empty (or missing) slot at the cursor.
#[derive(Debug, Clone)]
pub struct ChorusRotation<'a> {
    chorus: &'a [ChorusSlot],
    position: usize,
}

impl<'a> ChorusRotation<'a> {
    pub fn new(chorus: &'a [ChorusSlot]) -> Self {
        Self { chorus, position: 0 }
    }
}

impl<'a> Iterator for ChorusRotation<'a> {
    type Item = Option<&'a Bird>;

    fn next(&mut self) -> Option<Self::Item> {
        let bird = self.chorus.get(self.position).and_then(ChorusSlot::bird);
        self.position += 1;
        if self
            .chorus
            .get(self.position)
            .map_or(true, ChorusSlot::is_empty)
        {
            self.position = 0;
        }
        Some(bird)
    }
}

impl ChorusWindow {
    /// Events for `alarm` in the window opening at `window_start`.
    ///
    /// Always returns `event_count()` events. Those landing on an empty slot
    /// carry no bird and no body.
    pub fn compute<Tz: TimeZone>(
        &self,
        alarm: &Alarm,
        window_start: &DateTime<Tz>,
    ) -> Vec<NotificationEvent> {
        let start = window_start.with_timezone(&Utc);

        ChorusRotation::new(&alarm.chorus)
            .take(self.event_count())
            .enumerate()
            .map(|(index, bird)| NotificationEvent {
                alarm_id: alarm.uuid,
                fire_instant: start + self.offset(index),
                body: bird.and_then(|b| self.message(&b.name, index)),
                bird: bird.cloned(),
                message_index: index,
                title: self.title().to_string(),
            })
            .collect()
    }
}

/// Events for `alarm` using the default 20-second, 15-event window.
pub fn compute_schedule<Tz: TimeZone>(
    alarm: &Alarm,
    window_start: &DateTime<Tz>,
) -> Vec<NotificationEvent> {
    ChorusWindow::default().compute(alarm, window_start)
}
