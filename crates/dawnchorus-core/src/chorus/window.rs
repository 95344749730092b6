use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Seconds between consecutive notifications.
pub const DEFAULT_STEP_SECS: u32 = 20;

/// Last offset (inclusive) at which a notification is issued.
pub const DEFAULT_SPAN_SECS: u32 = 280;

pub const DEFAULT_TITLE: &str = "Dawn Chorus Alarm";

/// One phrase per event of the default window, in order.
pub const DEFAULT_PHRASES: [&str; 15] = [
    "starts the chorus",
    "joins the chorus",
    "joins the chorus",
    "joins the chorus",
    "joins the chorus",
    "is singing, wake up",
    "is singing, wake up",
    "is singing, wake up",
    "is singing its heart out",
    "is singing its heart out",
    "is wondering if you'll ever wake up",
    "is wondering if you'll ever wake up",
    "is wondering if you'll ever wake up",
    "is wondering if you'll ever wake up",
    "is wondering if you'll ever wake up",
];

/// Timing and wording of a wake-up window.
///
/// Construction checks that there is exactly one phrase per event, so
/// changing the step or span without resizing the phrase list fails early
/// instead of indexing past the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChorusWindow {
    step_secs: u32,
    span_secs: u32,
    title: String,
    phrases: Vec<String>,
}

impl ChorusWindow {
    pub fn new(
        step_secs: u32,
        span_secs: u32,
        title: impl Into<String>,
        phrases: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if step_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "step_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        let expected = Self::count_events(step_secs, span_secs);
        if phrases.len() != expected {
            return Err(ValidationError::PhraseCountMismatch {
                expected,
                actual: phrases.len(),
            });
        }
        Ok(Self {
            step_secs,
            span_secs,
            title: title.into(),
            phrases,
        })
    }

    fn count_events(step_secs: u32, span_secs: u32) -> usize {
        (span_secs / step_secs) as usize + 1
    }

    /// Number of notifications issued per window.
    pub fn event_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn step(&self) -> Duration {
        Duration::seconds(i64::from(self.step_secs))
    }

    pub fn span(&self) -> Duration {
        Duration::seconds(i64::from(self.span_secs))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Offset from the window start of the event at `index`.
    pub fn offset(&self, index: usize) -> Duration {
        self.step() * index as i32
    }

    /// Notification body for `bird_name` at event `index`.
    pub fn message(&self, bird_name: &str, index: usize) -> Option<String> {
        self.phrases
            .get(index)
            .map(|phrase| format!("A {bird_name} {phrase}!"))
    }
}

impl Default for ChorusWindow {
    fn default() -> Self {
        Self {
            step_secs: DEFAULT_STEP_SECS,
            span_secs: DEFAULT_SPAN_SECS,
            title: DEFAULT_TITLE.to_string(),
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for ChorusWindow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            step_secs: u32,
            span_secs: u32,
            title: String,
            phrases: Vec<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        ChorusWindow::new(raw.step_secs, raw.span_secs, raw.title, raw.phrases)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_has_15_events() {
        let w = ChorusWindow::default();
        assert_eq!(w.event_count(), 15);
        assert_eq!(w.offset(14), Duration::seconds(280));
    }

    #[test]
    fn default_matches_validated_construction() {
        let phrases = DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect();
        let w = ChorusWindow::new(DEFAULT_STEP_SECS, DEFAULT_SPAN_SECS, DEFAULT_TITLE, phrases).unwrap();
        assert_eq!(w, ChorusWindow::default());
    }

    #[test]
    fn rejects_phrase_count_mismatch() {
        let phrases = DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect();
        let err = ChorusWindow::new(30, 280, DEFAULT_TITLE, phrases).unwrap_err();
        assert_eq!(
            err,
            ValidationError::PhraseCountMismatch {
                expected: 10,
                actual: 15
            }
        );
    }

    #[test]
    fn rejects_zero_step() {
        assert!(ChorusWindow::new(0, 280, DEFAULT_TITLE, Vec::new()).is_err());
    }

    #[test]
    fn message_text() {
        let w = ChorusWindow::default();
        assert_eq!(w.message("Robin", 0).as_deref(), Some("A Robin starts the chorus!"));
        assert_eq!(w.message("Robin", 5).as_deref(), Some("A Robin is singing, wake up!"));
        assert_eq!(
            w.message("Robin", 14).as_deref(),
            Some("A Robin is wondering if you'll ever wake up!")
        );
        assert!(w.message("Robin", 15).is_none());
    }

    #[test]
    fn deserialize_validates() {
        let json = serde_json::json!({
            "step_secs": 60,
            "span_secs": 120,
            "title": "Wake",
            "phrases": ["one", "two", "three"]
        });
        let w: ChorusWindow = serde_json::from_value(json).unwrap();
        assert_eq!(w.event_count(), 3);

        let bad = serde_json::json!({
            "step_secs": 60,
            "span_secs": 120,
            "title": "Wake",
            "phrases": ["one"]
        });
        assert!(serde_json::from_value::<ChorusWindow>(bad).is_err());
    }
}
