//! Wire types for the gaze service HTTP contract.
//!
//! Every response is decoded here, once, into structs with explicit
//! optional fields; nothing downstream touches free-form JSON. The service
//! is a Flask app that leans on Python truthiness, so boolean flags can
//! arrive as `true`/`false`, `null`, or an empty string — `truthy_flag`
//! folds all of those into a plain `bool` at the boundary.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize)]
pub struct FrameRequest<'a> {
    pub image: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ActionRequest<'a> {
    pub action: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SensitivityRequest {
    pub sensitivity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutResponse {
    pub keys: Vec<String>,
}

/// Everything `/api/process-frame` may report. All fields are optional:
/// the service omits or nulls whatever the frame did not yield, and sends
/// only `status` while tracking is disabled on its side.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameReport {
    #[serde(default)]
    pub eye_position: Option<(f32, f32)>,
    #[serde(default)]
    pub eye_direction: Option<String>,
    #[serde(default, deserialize_with = "opt_truthy_flag")]
    pub is_blinking: Option<bool>,
    #[serde(default)]
    pub ear_value: Option<f32>,
    #[serde(default)]
    pub typed_text: Option<String>,
    #[serde(default)]
    pub letter_index: Option<usize>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "opt_truthy_flag")]
    pub suggest_active: Option<bool>,
    #[serde(default, deserialize_with = "opt_truthy_flag")]
    pub force_suggest_mode: Option<bool>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Composed-text state returned by `/api/type` and `/api/clear-text`.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeState {
    pub text: String,
    pub letter_index: usize,
    #[serde(deserialize_with = "truthy_flag")]
    pub suggest_active: bool,
    #[serde(deserialize_with = "truthy_flag")]
    pub force_suggest_mode: bool,
    pub suggestions: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Truthy {
    Bool(bool),
    Str(String),
    Num(f64),
    Null,
}

impl Truthy {
    fn as_bool(&self) -> bool {
        match self {
            Truthy::Bool(value) => *value,
            Truthy::Str(value) => !value.is_empty(),
            Truthy::Num(value) => *value != 0.0,
            Truthy::Null => false,
        }
    }
}

fn truthy_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Truthy::deserialize(deserializer)?.as_bool())
}

fn opt_truthy_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Truthy>::deserialize(deserializer)?;
    Ok(value.map(|flag| Some(flag.as_bool())).unwrap_or(Some(false)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_frame_report() {
        let raw = serde_json::json!({
            "eye_position": [41.5, 52.0],
            "eye_direction": "LEFT",
            "is_blinking": false,
            "ear_value": 0.31,
            "command": "LEFT",
            "typed_text": "HELLO ",
            "letter_index": 7,
            "suggest_active": true,
            "force_suggest_mode": false,
            "suggestions": ["the", "this", "that"]
        });

        let report: FrameReport = serde_json::from_value(raw).unwrap();
        assert_eq!(report.eye_position, Some((41.5, 52.0)));
        assert_eq!(report.eye_direction.as_deref(), Some("LEFT"));
        assert_eq!(report.is_blinking, Some(false));
        assert_eq!(report.ear_value, Some(0.31));
        assert_eq!(report.command.as_deref(), Some("LEFT"));
        assert_eq!(report.typed_text.as_deref(), Some("HELLO "));
        assert_eq!(report.letter_index, Some(7));
        assert_eq!(report.suggest_active, Some(true));
        assert_eq!(report.force_suggest_mode, Some(false));
        assert!(report.error.is_none());
    }

    #[test]
    fn decodes_idle_status_report() {
        // The service answers only with a status line while its own
        // tracking flag is off; every stateful field stays absent.
        let report: FrameReport =
            serde_json::from_str(r#"{"status": "Tracking not active"}"#).unwrap();
        assert_eq!(report.status.as_deref(), Some("Tracking not active"));
        assert!(report.typed_text.is_none());
        assert!(report.letter_index.is_none());
        assert!(report.suggestions.is_none());
    }

    #[test]
    fn decodes_error_report() {
        let report: FrameReport =
            serde_json::from_str(r#"{"error": "Failed to decode image"}"#).unwrap();
        assert_eq!(report.error.as_deref(), Some("Failed to decode image"));
    }

    #[test]
    fn truthiness_of_flags() {
        // With no composed text the service computes `suggest_active` as the
        // empty string rather than `false`.
        let raw = r#"{
            "text": "",
            "letter_index": 0,
            "suggest_active": "",
            "force_suggest_mode": false,
            "suggestions": ["", "", ""]
        }"#;
        let state: ComposeState = serde_json::from_str(raw).unwrap();
        assert!(!state.suggest_active);

        let raw = r#"{
            "text": "HI ",
            "letter_index": 1,
            "suggest_active": true,
            "force_suggest_mode": "yes",
            "suggestions": ["hi", "his", "him"]
        }"#;
        let state: ComposeState = serde_json::from_str(raw).unwrap();
        assert!(state.suggest_active);
        assert!(state.force_suggest_mode);
    }

    #[test]
    fn null_position_and_flags() {
        let raw = r#"{
            "eye_position": null,
            "eye_direction": "CENTER",
            "is_blinking": null,
            "ear_value": 0.0
        }"#;
        let report: FrameReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.eye_position, None);
        assert_eq!(report.is_blinking, Some(false));
    }

    #[test]
    fn decodes_layout() {
        let layout: LayoutResponse = serde_json::from_str(r#"{"keys": ["A", "B"]}"#).unwrap();
        assert_eq!(layout.keys, vec!["A", "B"]);
    }
}
