//! Property tests for chorus window computation.

use chrono::{Duration, TimeZone, Utc};
use dawnchorus_core::{compute_schedule, Alarm, AlarmTime, Bird, ChorusSlot};
use proptest::prelude::*;

fn slot_strategy() -> impl Strategy<Value = ChorusSlot> {
    prop_oneof![
        Just(ChorusSlot::Empty),
        "[A-Z][a-z]{2,8}".prop_map(|name| ChorusSlot::Filled(Bird::new(name))),
    ]
}

fn chorus_strategy() -> impl Strategy<Value = Vec<ChorusSlot>> {
    prop::collection::vec(slot_strategy(), 0..8)
}

/// Bird names the rotation can ever reach: the run of filled slots at the start.
fn reachable(chorus: &[ChorusSlot]) -> Vec<String> {
    chorus
        .iter()
        .take_while(|slot| !slot.is_empty())
        .filter_map(|slot| slot.bird().map(|b| b.name.clone()))
        .collect()
}

proptest! {
    #[test]
    fn always_fifteen_events_twenty_seconds_apart(
        chorus in chorus_strategy(),
        hour in 0u8..24,
        minute in 0u8..60,
        start_secs in 0i64..4_000_000_000,
    ) {
        let alarm = Alarm::new(AlarmTime::new(hour, minute), chorus);
        let start = Utc.timestamp_opt(start_secs, 0).unwrap();
        let events = compute_schedule(&alarm, &start);

        prop_assert_eq!(events.len(), 15);
        for (i, event) in events.iter().enumerate() {
            prop_assert_eq!(event.fire_instant, start + Duration::seconds(20 * i as i64));
            prop_assert_eq!(event.message_index, i);
            prop_assert_eq!(event.alarm_id, alarm.uuid);
            prop_assert_eq!(event.bird.is_some(), event.body.is_some());
        }
    }

    #[test]
    fn rotation_only_visits_leading_run(chorus in chorus_strategy()) {
        let alarm = Alarm::new(AlarmTime::new(7, 0), chorus);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
        let events = compute_schedule(&alarm, &start);
        let run = reachable(&alarm.chorus);

        if run.is_empty() {
            // Leading gap: slot 0 is never a bird, so only later slots can sing.
            prop_assert!(events[0].bird.is_none());
        } else {
            for (i, event) in events.iter().enumerate() {
                let name = event.bird.as_ref().map(|b| b.name.clone());
                prop_assert_eq!(name, Some(run[i % run.len()].clone()));
            }
        }
    }

    #[test]
    fn body_names_the_bird(chorus in chorus_strategy()) {
        let alarm = Alarm::new(AlarmTime::new(7, 0), chorus);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
        for event in compute_schedule(&alarm, &start) {
            if let (Some(bird), Some(body)) = (&event.bird, &event.body) {
                let prefix = format!("A {} ", bird.name);
                prop_assert!(body.starts_with(&prefix));
                prop_assert!(body.ends_with('!'));
            }
        }
    }
}

#[test]
fn two_bird_chorus_with_trailing_gap_alternates() {
    let alarm = Alarm::new(
        AlarmTime::new(7, 0),
        vec![Bird::new("A").into(), Bird::new("B").into(), ChorusSlot::Empty],
    );
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
    let names: String = compute_schedule(&alarm, &start)
        .iter()
        .map(|e| e.bird.as_ref().map_or("_", |b| b.name.as_str()).to_string())
        .collect();
    assert_eq!(names, "ABABABABABABABA");
}

#[test]
fn robin_messages() {
    let alarm = Alarm::new(AlarmTime::new(7, 0), vec![Bird::new("Robin").into()]);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
    let events = compute_schedule(&alarm, &start);
    assert_eq!(events[0].body.as_deref(), Some("A Robin starts the chorus!"));
    assert_eq!(events[5].body.as_deref(), Some("A Robin is singing, wake up!"));
}
