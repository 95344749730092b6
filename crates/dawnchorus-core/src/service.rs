//! Alarm scheduling service.
//!
//! Places a chorus window in time, pushes its events through a [`Notifier`],
//! and produces the alarm updates for clearing and snoozing.
//!
//! ## Window placement
//!
//! ```text
//! schedule:  today at HH:MM:00, or tomorrow if that is not after `now`
//! snooze:    now + 10 min, seconds dropped (alarm time ignored)
//! ```
//!
//! Every operation holds a lock keyed by the alarm UUID for its whole
//! duration, so schedule and cancel calls for one alarm never interleave at
//! the notifier.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chorus::{ChorusWindow, NotificationEvent};
use crate::error::{NotifierError, Result, ValidationError};
use crate::model::{Alarm, AlarmTime, NotificationHandle};
use crate::notifier::Notifier;

pub const DEFAULT_SNOOZE_MINUTES: u32 = 10;

/// One event the notifier refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub message_index: usize,
    pub fire_instant: DateTime<Utc>,
    pub error: NotifierError,
}

/// Outcome of pushing one window through the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    pub alarm_id: Uuid,
    pub window_start: DateTime<Utc>,
    /// Handles of the notifications the platform accepted.
    pub handles: Vec<NotificationHandle>,
    /// Events that landed on an empty chorus slot.
    pub skipped_empty: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl ScheduleReport {
    pub fn scheduled_count(&self) -> usize {
        self.handles.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Copy of `alarm` recording this report's handles.
    pub fn apply_to(&self, alarm: &Alarm) -> Alarm {
        alarm.with_notifications(self.handles.clone())
    }
}

/// New effective fire time after a snooze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnoozedTime {
    pub actual: DateTime<FixedOffset>,
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnoozeOutcome {
    pub time: SnoozedTime,
    pub report: ScheduleReport,
}

/// First instant of the window for an alarm set to `time`.
///
/// Uses `now`'s local date; moves to the next day when that instant is not
/// strictly after `now`. A wall time skipped by a DST change resolves one
/// hour later.
pub fn window_start<Tz: TimeZone>(time: AlarmTime, now: &DateTime<Tz>) -> Result<DateTime<Tz>, ValidationError> {
    time.validate()?;
    let clock = NaiveTime::from_hms_opt(u32::from(time.hour), u32::from(time.minute), 0).ok_or(
        ValidationError::InvalidAlarmTime {
            hour: time.hour,
            minute: time.minute,
        },
    )?;

    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = resolve_local(&tz, today.and_time(clock))?;
    if candidate > *now {
        return Ok(candidate);
    }

    let tomorrow = today.succ_opt().ok_or_else(|| ValidationError::InvalidValue {
        field: "time".into(),
        message: format!("no day after {today}"),
    })?;
    resolve_local(&tz, tomorrow.and_time(clock))
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>, ValidationError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "time".into(),
            message: format!("{naive} does not exist in the local time zone"),
        })
}

/// First instant of a snoozed window: `now + offset`, seconds dropped.
pub fn snooze_start<Tz: TimeZone>(now: &DateTime<Tz>, offset: Duration) -> DateTime<Tz> {
    let shifted = now.clone() + offset;
    let trim = Duration::seconds(i64::from(shifted.second()))
        + Duration::nanoseconds(i64::from(shifted.nanosecond()));
    shifted - trim
}

/// Drives chorus windows through a [`Notifier`].
pub struct AlarmScheduler<N> {
    notifier: N,
    window: ChorusWindow,
    snooze: Duration,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<N: Notifier> AlarmScheduler<N> {
    /// Scheduler with the default 15-event window and 10-minute snooze.
    pub fn new(notifier: N) -> Self {
        Self::with_window(
            notifier,
            ChorusWindow::default(),
            Duration::minutes(i64::from(DEFAULT_SNOOZE_MINUTES)),
        )
    }

    pub fn with_window(notifier: N, window: ChorusWindow, snooze: Duration) -> Self {
        Self {
            notifier,
            window,
            snooze,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn window(&self) -> &ChorusWindow {
        &self.window
    }

    fn alarm_lock(&self, alarm_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(alarm_id).or_default())
    }

    /// Drop the alarm's lock entry when no other operation holds or waits on it.
    fn release_lock(&self, alarm_id: Uuid, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Clones are only taken under `locks`, so the count cannot grow here.
        let idle = locks
            .get(&alarm_id)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(&alarm_id);
        }
    }

    /// Schedule the window for the alarm's next configured fire time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAlarmTime` when the alarm time is out of range. No
    /// notifier call is made in that case. Delivery failures are not errors;
    /// they are listed in the report.
    pub fn schedule_alarm<Tz: TimeZone>(&self, alarm: &Alarm, now: &DateTime<Tz>) -> Result<ScheduleReport> {
        let start = window_start(alarm.time, now)?;
        let lock = self.alarm_lock(alarm.uuid);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let report = self.emit(alarm, &start);
        info!(
            alarm_id = %alarm.uuid,
            platform = self.notifier.platform(),
            alarm_time = %alarm.time,
            window_start = %report.window_start,
            scheduled = report.scheduled_count(),
            skipped = report.skipped_empty,
            failed = report.failures.len(),
            "scheduled chorus window"
        );
        Ok(report)
    }

    /// Schedule a window starting one snooze interval after `now`.
    ///
    /// The alarm's configured time is not consulted and not changed; the
    /// caller applies the returned time to its own state.
    pub fn schedule_snoozed_alarm<Tz: TimeZone>(&self, alarm: &Alarm, now: &DateTime<Tz>) -> Result<SnoozeOutcome> {
        let start = snooze_start(now, self.snooze);
        let lock = self.alarm_lock(alarm.uuid);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let report = self.emit(alarm, &start);
        let actual = start.with_timezone(&start.offset().fix());
        info!(
            alarm_id = %alarm.uuid,
            platform = self.notifier.platform(),
            window_start = %report.window_start,
            scheduled = report.scheduled_count(),
            failed = report.failures.len(),
            "scheduled snoozed chorus window"
        );
        Ok(SnoozeOutcome {
            time: SnoozedTime {
                hour: actual.hour(),
                minute: actual.minute(),
                actual,
            },
            report,
        })
    }

    /// Cancel the alarm's pending notifications and return it with an empty
    /// notification list. The input is left untouched.
    ///
    /// Cancel failures are logged and do not stop the clear. A cleared alarm
    /// no longer keeps an entry in the lock map.
    pub fn clear_notifications(&self, alarm: &Alarm) -> Alarm {
        let lock = self.alarm_lock(alarm.uuid);
        {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.cancel(alarm.uuid);
        }
        self.release_lock(alarm.uuid, lock);

        alarm.with_notifications(Vec::new())
    }

    fn cancel(&self, alarm_id: Uuid) {
        if let Err(e) = self.notifier.cancel_all_for_alarm(alarm_id) {
            warn!(alarm_id = %alarm_id, platform = self.notifier.platform(), error = %e, "failed to cancel alarm notifications");
        }
        if self.notifier.clears_broadly() {
            warn!(
                alarm_id = %alarm_id,
                platform = self.notifier.platform(),
                "clearing every pending notification, not only this alarm's"
            );
            if let Err(e) = self.notifier.cancel_all() {
                warn!(platform = self.notifier.platform(), error = %e, "failed to clear all notifications");
            }
        }
    }

    fn emit<Tz: TimeZone>(&self, alarm: &Alarm, start: &DateTime<Tz>) -> ScheduleReport {
        let events = self.window.compute(alarm, start);
        let mut report = ScheduleReport {
            alarm_id: alarm.uuid,
            window_start: start.with_timezone(&Utc),
            handles: Vec::with_capacity(events.len()),
            skipped_empty: 0,
            failures: Vec::new(),
        };

        for event in events {
            if !event.has_bird() {
                report.skipped_empty += 1;
                continue;
            }
            self.deliver(&event, &mut report);
        }
        report
    }

    fn deliver(&self, event: &NotificationEvent, report: &mut ScheduleReport) {
        match self.notifier.schedule_local(event) {
            Ok(()) => {
                debug!(
                    alarm_id = %event.alarm_id,
                    index = event.message_index,
                    fire_instant = %event.fire_instant,
                    "notification scheduled"
                );
                report.handles.push(event.handle());
            }
            Err(e) => {
                warn!(
                    alarm_id = %event.alarm_id,
                    index = event.message_index,
                    platform = self.notifier.platform(),
                    error = %e,
                    "failed to schedule notification, continuing with the rest of the window"
                );
                report.failures.push(DeliveryFailure {
                    message_index: event.message_index,
                    fire_instant: event.fire_instant,
                    error: e,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bird, ChorusSlot};
    use crate::notifier::{NotifierCall, RecordingNotifier};
    use chrono::{FixedOffset, NaiveDate};
    use chrono_tz::Europe::Berlin;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, s).unwrap()
    }

    fn robin_alarm(hour: u8, minute: u8) -> Alarm {
        Alarm::new(AlarmTime::new(hour, minute), vec![Bird::new("Robin").into()])
    }

    #[test]
    fn window_start_today_when_later() {
        assert_eq!(window_start(AlarmTime::new(9, 0), &at(8, 0, 0)).unwrap(), at(9, 0, 0));
    }

    #[test]
    fn window_start_tomorrow_when_passed() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap();
        assert_eq!(window_start(AlarmTime::new(7, 0), &at(8, 0, 0)).unwrap(), expected);
    }

    #[test]
    fn window_start_tomorrow_when_equal() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        assert_eq!(window_start(AlarmTime::new(8, 0), &at(8, 0, 0)).unwrap(), expected);
    }

    #[test]
    fn window_start_keeps_local_wall_time() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 4, 22, 30, 0).unwrap();
        let start = window_start(AlarmTime::new(6, 15), &now).unwrap();
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!((start.hour(), start.minute(), start.second()), (6, 15, 0));
    }

    #[test]
    fn snooze_start_drops_seconds() {
        assert_eq!(snooze_start(&at(8, 0, 0), Duration::minutes(10)), at(8, 10, 0));
        let now = at(8, 0, 42) + Duration::milliseconds(512);
        assert_eq!(snooze_start(&now, Duration::minutes(10)), at(8, 10, 0));
    }

    #[test]
    fn schedule_alarm_emits_bird_events_only() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new());
        let alarm = Alarm::new(
            AlarmTime::new(9, 0),
            vec![ChorusSlot::Empty, Bird::new("Robin").into()],
        );
        let report = scheduler.schedule_alarm(&alarm, &at(8, 0, 0)).unwrap();
        // _ A _ A ... over 15 events
        assert_eq!(report.scheduled_count(), 7);
        assert_eq!(report.skipped_empty, 8);
        assert!(report.is_complete());
        assert_eq!(scheduler.notifier().scheduled().len(), 7);
    }

    #[test]
    fn invalid_time_is_rejected_before_notifier() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new());
        let err = scheduler.schedule_alarm(&robin_alarm(25, 0), &at(8, 0, 0)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Validation(ValidationError::InvalidAlarmTime { hour: 25, minute: 0 })
        ));
        assert!(scheduler.notifier().calls().is_empty());
    }

    #[test]
    fn failures_do_not_abort_the_window() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new().failing_at(3).failing_at(9));
        let report = scheduler.schedule_alarm(&robin_alarm(9, 0), &at(8, 0, 0)).unwrap();
        assert_eq!(report.scheduled_count(), 13);
        let failed: Vec<usize> = report.failures.iter().map(|f| f.message_index).collect();
        assert_eq!(failed, vec![3, 9]);
        assert!(!report.is_complete());
    }

    #[test]
    fn snooze_ignores_alarm_time() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new());
        let alarm = robin_alarm(6, 30);
        let outcome = scheduler.schedule_snoozed_alarm(&alarm, &at(8, 0, 0)).unwrap();
        assert_eq!((outcome.time.hour, outcome.time.minute), (8, 10));
        assert_eq!(outcome.report.window_start, at(8, 10, 0));
        assert_eq!(alarm.time, AlarmTime::new(6, 30));
        let scheduled = scheduler.notifier().scheduled();
        assert_eq!(scheduled.len(), 15);
        assert_eq!(scheduled[0].fire_instant, at(8, 10, 0));
        assert_eq!(scheduled[14].fire_instant, at(8, 14, 40));
    }

    #[test]
    fn clear_is_narrow_unless_notifier_asks() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new());
        let alarm = robin_alarm(7, 0);
        scheduler.clear_notifications(&alarm);
        assert_eq!(
            scheduler.notifier().calls(),
            vec![NotifierCall::CancelAllForAlarm { alarm_id: alarm.uuid }]
        );

        let broad = AlarmScheduler::new(RecordingNotifier::new().with_broad_clear());
        broad.clear_notifications(&alarm);
        assert_eq!(
            broad.notifier().calls(),
            vec![
                NotifierCall::CancelAllForAlarm { alarm_id: alarm.uuid },
                NotifierCall::CancelAll
            ]
        );
    }

    #[test]
    fn clear_releases_the_alarm_lock_entry() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new());
        let first = robin_alarm(9, 0);
        let second = robin_alarm(10, 0);
        scheduler.schedule_alarm(&first, &at(8, 0, 0)).unwrap();
        scheduler.schedule_alarm(&second, &at(8, 0, 0)).unwrap();
        assert_eq!(scheduler.locks.lock().unwrap().len(), 2);

        scheduler.clear_notifications(&first);
        let locks = scheduler.locks.lock().unwrap();
        assert_eq!(locks.len(), 1);
        assert!(locks.contains_key(&second.uuid));
    }

    #[test]
    fn clear_keeps_entry_while_another_holder_exists() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new());
        let alarm = robin_alarm(9, 0);
        let held = scheduler.alarm_lock(alarm.uuid);
        scheduler.clear_notifications(&alarm);
        assert!(scheduler.locks.lock().unwrap().contains_key(&alarm.uuid));

        drop(held);
        scheduler.clear_notifications(&alarm);
        assert!(scheduler.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn gap_wall_time_moves_one_hour_forward() {
        // 2024-03-31 02:00 CET jumps to 03:00 CEST
        let now = Berlin.with_ymd_and_hms(2024, 3, 31, 0, 30, 0).unwrap();
        let start = window_start(AlarmTime::new(2, 30), &now).unwrap();
        assert_eq!((start.hour(), start.minute()), (3, 30));
        assert_eq!(start.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
    }

    #[test]
    fn repeated_wall_time_takes_earliest_instant() {
        // 2024-10-27 03:00 CEST falls back to 02:00 CET
        let now = Berlin.with_ymd_and_hms(2024, 10, 27, 0, 0, 0).unwrap();
        let start = window_start(AlarmTime::new(2, 30), &now).unwrap();
        assert_eq!(start.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
        assert_eq!(start.offset().fix().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn next_day_keeps_wall_time_across_dst_change() {
        let now = Berlin.with_ymd_and_hms(2024, 3, 30, 22, 0, 0).unwrap();
        let start = window_start(AlarmTime::new(7, 0), &now).unwrap();
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!((start.hour(), start.minute()), (7, 0));
        assert_eq!(start.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 3, 31, 5, 0, 0).unwrap());

        let now = Berlin.with_ymd_and_hms(2024, 10, 26, 22, 0, 0).unwrap();
        let start = window_start(AlarmTime::new(7, 0), &now).unwrap();
        assert_eq!(start.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 10, 27, 6, 0, 0).unwrap());
    }

    #[test]
    fn report_applies_handles_to_alarm() {
        let scheduler = AlarmScheduler::new(RecordingNotifier::new());
        let alarm = robin_alarm(9, 0);
        let report = scheduler.schedule_alarm(&alarm, &at(8, 0, 0)).unwrap();
        let updated = report.apply_to(&alarm);
        assert_eq!(updated.notifications.len(), 15);
        assert_eq!(updated.notifications[0], NotificationHandle::for_event(alarm.uuid, 0));
        let cleared = scheduler.clear_notifications(&updated);
        assert!(cleared.notifications.is_empty());
        assert_eq!(updated.notifications.len(), 15);
    }
}
