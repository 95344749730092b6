//! The chorus window: which bird sings when, and what the notification says.

mod schedule;
mod window;

pub use schedule::{compute_schedule, ChorusRotation, NotificationEvent};
pub use window::{ChorusWindow, DEFAULT_PHRASES, DEFAULT_SPAN_SECS, DEFAULT_STEP_SECS, DEFAULT_TITLE};
