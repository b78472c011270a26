//! Local mirror of the remote gaze session.
//!
//! Composed text, cursor index, suggestions, and suggestion-mode flags are
//! server-authoritative: the `apply_*` entry points overwrite them verbatim
//! from the latest response, atomically under the controller's lock. The
//! client's own authority is limited to `tracking` and `sensitivity`.

use chrono::{DateTime, Utc};

use crate::keyboard::KeyboardLayout;
use crate::remote::{ComposeState, FrameReport};

pub const SENSITIVITY_MIN: f32 = 0.1;
pub const SENSITIVITY_MAX: f32 = 1.5;
pub const SENSITIVITY_DEFAULT: f32 = 0.7;
pub const SENSITIVITY_STEP: f32 = 0.1;

/// Suggestion slots shown in suggestion mode; responses are padded or
/// truncated to exactly this many.
pub const SUGGESTION_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GazeDirection {
    Left,
    Right,
    #[default]
    Center,
}

impl GazeDirection {
    /// Parses the service's direction token; anything unrecognized reads as
    /// `None` and callers keep the previous direction.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "LEFT" => Some(GazeDirection::Left),
            "RIGHT" => Some(GazeDirection::Right),
            "CENTER" => Some(GazeDirection::Center),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GazeDirection::Left => "Left",
            GazeDirection::Right => "Right",
            GazeDirection::Center => "Center",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub started_at: DateTime<Utc>,

    // Client authority
    pub tracking: bool,
    pub tracking_since: Option<DateTime<Utc>>,
    pub sensitivity: f32,

    // Camera health; a failed acquisition leaves a persistent notice shown
    // in place of the video panel.
    pub webcam_active: bool,
    pub camera_notice: Option<String>,

    // Latest gaze sample (replaced wholesale each poll)
    pub eye_position: Option<(f32, f32)>,
    pub eye_direction: GazeDirection,
    pub blinking: bool,
    pub ear_value: f32,

    // Server authority
    pub text: String,
    pub letter_index: usize,
    pub suggestions: Vec<String>,
    pub suggest_active: bool,
    pub force_suggest_mode: bool,
    pub keys: Vec<String>,
}

impl SessionState {
    pub fn new(layout: KeyboardLayout) -> Self {
        Self {
            started_at: Utc::now(),
            tracking: false,
            tracking_since: None,
            sensitivity: SENSITIVITY_DEFAULT,
            webcam_active: false,
            camera_notice: None,
            eye_position: None,
            eye_direction: GazeDirection::default(),
            blinking: false,
            ear_value: 0.0,
            text: String::new(),
            letter_index: 0,
            suggestions: vec![String::new(); SUGGESTION_SLOTS],
            suggest_active: false,
            force_suggest_mode: false,
            keys: layout.into_keys(),
        }
    }

    /// Whether the UI shows the suggestion row instead of the keyboard grid.
    pub fn suggesting(&self) -> bool {
        self.suggest_active || self.force_suggest_mode
    }

    /// Applies a frame-processing report. Fields the service omitted leave
    /// the previous value in place, with two exceptions mirroring the demo
    /// contract: a missing blink flag reads as "not blinking" and a missing
    /// EAR reads as zero. A report carrying `error` must not reach here.
    pub fn apply_frame(&mut self, report: &FrameReport) {
        if let Some(position) = report.eye_position {
            self.eye_position = Some(position);
        }
        if let Some(direction) = report
            .eye_direction
            .as_deref()
            .and_then(GazeDirection::parse)
        {
            self.eye_direction = direction;
        }
        self.blinking = report.is_blinking.unwrap_or(false);
        self.ear_value = report.ear_value.unwrap_or(0.0);

        if let Some(text) = &report.typed_text {
            self.text = text.clone();
        }
        if let Some(index) = report.letter_index {
            self.letter_index = index;
        }
        if let Some(suggestions) = &report.suggestions {
            self.suggestions = normalize_suggestions(suggestions.clone());
        }
        if let Some(active) = report.suggest_active {
            self.suggest_active = active;
        }
        if let Some(forced) = report.force_suggest_mode {
            self.force_suggest_mode = forced;
        }
    }

    /// Applies a composed-text round-trip response wholesale; nothing is
    /// merged with prior state.
    pub fn apply_compose(&mut self, outcome: &ComposeState) {
        self.text = outcome.text.clone();
        self.letter_index = outcome.letter_index;
        self.suggest_active = outcome.suggest_active;
        self.force_suggest_mode = outcome.force_suggest_mode;
        self.suggestions = normalize_suggestions(outcome.suggestions.clone());
    }

    /// Clamps into `[SENSITIVITY_MIN, SENSITIVITY_MAX]` and returns the
    /// stored value.
    pub fn set_sensitivity(&mut self, value: f32) -> f32 {
        self.sensitivity = value.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX);
        self.sensitivity
    }

    pub fn set_tracking(&mut self, active: bool) {
        self.tracking = active;
        self.tracking_since = active.then(Utc::now);
        if !active {
            self.blinking = false;
        }
    }
}

fn normalize_suggestions(mut suggestions: Vec<String>) -> Vec<String> {
    suggestions.truncate(SUGGESTION_SLOTS);
    while suggestions.len() < SUGGESTION_SLOTS {
        suggestions.push(String::new());
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_report() -> FrameReport {
        FrameReport {
            eye_position: Some((40.0, 55.0)),
            eye_direction: Some("LEFT".to_string()),
            is_blinking: Some(true),
            ear_value: Some(0.19),
            typed_text: Some("HELLO".to_string()),
            letter_index: Some(12),
            suggestions: Some(vec!["he".into(), "hello".into(), "help".into()]),
            suggest_active: Some(true),
            force_suggest_mode: Some(true),
            command: Some("BLINK".to_string()),
            error: None,
            status: None,
        }
    }

    #[test]
    fn full_report_overwrites_every_field() {
        let mut state = SessionState::new(KeyboardLayout::fallback());
        state.text = "OLD".into();
        state.letter_index = 3;
        state.suggestions = vec!["a".into(), "b".into(), "c".into()];

        state.apply_frame(&full_report());

        assert_eq!(state.eye_position, Some((40.0, 55.0)));
        assert_eq!(state.eye_direction, GazeDirection::Left);
        assert!(state.blinking);
        assert_eq!(state.ear_value, 0.19);
        assert_eq!(state.text, "HELLO");
        assert_eq!(state.letter_index, 12);
        assert_eq!(
            state.suggestions,
            vec!["he".to_string(), "hello".to_string(), "help".to_string()]
        );
        assert!(state.suggest_active);
        assert!(state.force_suggest_mode);
    }

    #[test]
    fn missing_fields_keep_prior_state_except_blink_and_ear() {
        let mut state = SessionState::new(KeyboardLayout::fallback());
        state.apply_frame(&full_report());

        state.apply_frame(&FrameReport::default());

        // Server-authoritative fields survive an empty report...
        assert_eq!(state.text, "HELLO");
        assert_eq!(state.letter_index, 12);
        assert!(state.suggest_active);
        assert_eq!(state.eye_position, Some((40.0, 55.0)));
        assert_eq!(state.eye_direction, GazeDirection::Left);
        // ...while blink and EAR fall back to their resting values.
        assert!(!state.blinking);
        assert_eq!(state.ear_value, 0.0);
    }

    #[test]
    fn unknown_direction_keeps_previous() {
        let mut state = SessionState::new(KeyboardLayout::fallback());
        state.apply_frame(&full_report());
        assert_eq!(state.eye_direction, GazeDirection::Left);

        let report = FrameReport {
            eye_direction: Some("UPSIDE_DOWN".to_string()),
            ..FrameReport::default()
        };
        state.apply_frame(&report);
        assert_eq!(state.eye_direction, GazeDirection::Left);
    }

    #[test]
    fn compose_outcome_is_applied_wholesale() {
        let mut state = SessionState::new(KeyboardLayout::fallback());
        state.text = "STALE".into();
        state.suggest_active = true;

        state.apply_compose(&ComposeState {
            text: String::new(),
            letter_index: 0,
            suggest_active: false,
            force_suggest_mode: false,
            suggestions: vec![],
        });

        assert_eq!(state.text, "");
        assert_eq!(state.letter_index, 0);
        assert!(!state.suggest_active);
        assert!(!state.force_suggest_mode);
        assert_eq!(state.suggestions, vec!["", "", ""]);
    }

    #[test]
    fn suggestions_are_padded_and_truncated_to_three() {
        let mut state = SessionState::new(KeyboardLayout::fallback());
        state.apply_frame(&FrameReport {
            suggestions: Some(vec!["one".into()]),
            ..FrameReport::default()
        });
        assert_eq!(state.suggestions, vec!["one", "", ""]);

        state.apply_frame(&FrameReport {
            suggestions: Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            ..FrameReport::default()
        });
        assert_eq!(state.suggestions, vec!["a", "b", "c"]);
    }

    #[test]
    fn sensitivity_is_clamped_to_bounds() {
        let mut state = SessionState::new(KeyboardLayout::fallback());
        assert_eq!(state.set_sensitivity(0.7), 0.7);
        assert_eq!(state.set_sensitivity(9.0), SENSITIVITY_MAX);
        assert_eq!(state.set_sensitivity(-1.0), SENSITIVITY_MIN);
    }

    #[test]
    fn tracking_toggle_updates_anchor() {
        let mut state = SessionState::new(KeyboardLayout::fallback());
        state.set_tracking(true);
        assert!(state.tracking);
        assert!(state.tracking_since.is_some());

        state.blinking = true;
        state.set_tracking(false);
        assert!(!state.tracking);
        assert!(state.tracking_since.is_none());
        assert!(!state.blinking);
    }
}
