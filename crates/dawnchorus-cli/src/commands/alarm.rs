use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone};
use clap::{Args, ValueEnum};
use dawnchorus_core::{
    snooze_start, window_start, Alarm, AlarmScheduler, AndroidNotifier, Config, IosNotifier,
    NotificationEvent, Notifier,
};
use serde::Serialize;

use crate::device::{ConsoleDevice, DeviceOp};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Platform {
    Ios,
    Android,
}

#[derive(Args)]
pub struct AlarmArgs {
    /// Path to the alarm JSON file
    #[arg(long)]
    alarm: PathBuf,
    /// Reference instant (RFC 3339); defaults to the current local time
    #[arg(long, value_parser = parse_now)]
    now: Option<DateTime<FixedOffset>>,
    /// Config file to use instead of the one in the data directory
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    common: AlarmArgs,
    /// Place the window as a snooze from `now` instead of at the alarm time
    #[arg(long)]
    snooze: bool,
}

#[derive(Args)]
pub struct PlatformArgs {
    #[command(flatten)]
    common: AlarmArgs,
    /// Target notification platform
    #[arg(long, value_enum)]
    platform: Platform,
}

fn parse_now(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("invalid RFC 3339 time '{value}': {e}"))
}

impl AlarmArgs {
    fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(Config::load_from(path)?),
            None => Ok(Config::load_or_default()),
        }
    }

    fn alarm(&self) -> Result<Alarm, Box<dyn std::error::Error>> {
        read_alarm(&self.alarm)
    }
}

fn read_alarm(path: &Path) -> Result<Alarm, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read alarm file {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

fn scheduler(
    platform: Platform,
    config: &Config,
    device: &ConsoleDevice,
) -> Result<AlarmScheduler<Arc<dyn Notifier>>, Box<dyn std::error::Error>> {
    let notifier: Arc<dyn Notifier> = match platform {
        Platform::Ios => Arc::new(IosNotifier::with_presentation(
            device.clone(),
            config.ios_presentation(),
        )),
        Platform::Android => Arc::new(AndroidNotifier::with_presentation(
            device.clone(),
            config.android_presentation(),
        )),
    };
    Ok(AlarmScheduler::with_window(
        notifier,
        config.chorus_window()?,
        config.snooze_offset(),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct PreviewOutput {
    window_start: DateTime<FixedOffset>,
    events: Vec<NotificationEvent>,
}

/// An explicit `--now` keeps its fixed offset. Otherwise the local time zone
/// is used, so placement across a DST change follows the local calendar.
pub fn preview(args: PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.common.now {
        Some(now) => preview_at(&args, &now),
        None => preview_at(&args, &Local::now()),
    }
}

fn preview_at<Tz: TimeZone>(args: &PreviewArgs, now: &DateTime<Tz>) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.config()?;
    let alarm = args.common.alarm()?;

    let start = if args.snooze {
        snooze_start(now, config.snooze_offset())
    } else {
        window_start(alarm.time, now)?
    };
    let events = config.chorus_window()?.compute(&alarm, &start);
    print_json(&PreviewOutput {
        window_start: start.with_timezone(&start.offset().fix()),
        events,
    })
}

#[derive(Serialize)]
struct ScheduleOutput<T: Serialize> {
    platform: String,
    device: Vec<DeviceOp>,
    #[serde(flatten)]
    result: T,
}

#[derive(Serialize)]
struct Scheduled {
    report: dawnchorus_core::ScheduleReport,
    alarm: Alarm,
}

#[derive(Serialize)]
struct Cleared {
    alarm: Alarm,
}

pub fn schedule(args: PlatformArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.common.now {
        Some(now) => schedule_at(&args, &now),
        None => schedule_at(&args, &Local::now()),
    }
}

fn schedule_at<Tz: TimeZone>(args: &PlatformArgs, now: &DateTime<Tz>) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.config()?;
    let alarm = args.common.alarm()?;
    let device = ConsoleDevice::default();
    let scheduler = scheduler(args.platform, &config, &device)?;

    let report = scheduler.schedule_alarm(&alarm, now)?;
    let alarm = report.apply_to(&alarm);
    print_json(&ScheduleOutput {
        platform: scheduler.notifier().platform().to_string(),
        device: device.ops(),
        result: Scheduled { report, alarm },
    })
}

pub fn snooze(args: PlatformArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.common.now {
        Some(now) => snooze_at(&args, &now),
        None => snooze_at(&args, &Local::now()),
    }
}

fn snooze_at<Tz: TimeZone>(args: &PlatformArgs, now: &DateTime<Tz>) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.config()?;
    let alarm = args.common.alarm()?;
    let device = ConsoleDevice::default();
    let scheduler = scheduler(args.platform, &config, &device)?;

    let outcome = scheduler.schedule_snoozed_alarm(&alarm, now)?;
    print_json(&ScheduleOutput {
        platform: scheduler.notifier().platform().to_string(),
        device: device.ops(),
        result: outcome,
    })
}

pub fn clear(args: PlatformArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.config()?;
    let alarm = args.common.alarm()?;
    let device = ConsoleDevice::default();
    let scheduler = scheduler(args.platform, &config, &device)?;

    let alarm = scheduler.clear_notifications(&alarm);
    print_json(&ScheduleOutput {
        platform: scheduler.notifier().platform().to_string(),
        device: device.ops(),
        result: Cleared { alarm },
    })
}
