//! Keyboard layout shown in letter-selection mode.
//!
//! The layout itself is owned by the remote service; this module only
//! carries the fetched key list around and provides the fixed fallback
//! used when the layout endpoint cannot be reached.

/// Space glyph on the on-screen keyboard.
pub const KEY_SPACE: &str = "_";
/// Backspace glyph.
pub const KEY_BACKSPACE: &str = "←";
/// Enters direct-autocomplete mode on the remote composer.
pub const KEY_SUGGEST: &str = "💬";
/// Speaks the composed text (handled remotely).
pub const KEY_SPEAK: &str = "🔊";

/// Keys per row when the layout is rendered as a grid.
pub const GRID_COLUMNS: usize = 10;

/// Fallback layout used when the layout fetch fails. Matches the layout the
/// service ships by default, so a degraded session still renders correctly.
const FALLBACK_KEYS: [&str; 40] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "0",
    "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P",
    "A", "S", "D", "F", "G", "H", "J", "K", "L", KEY_SPACE,
    "Z", "X", "C", "V", "B", "N", "M", KEY_BACKSPACE, KEY_SUGGEST, KEY_SPEAK,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardLayout {
    keys: Vec<String>,
}

impl KeyboardLayout {
    pub fn from_keys(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// The fixed 40-key fallback, in fixed order.
    pub fn fallback() -> Self {
        Self {
            keys: FALLBACK_KEYS.iter().map(|key| key.to_string()).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<String> {
        self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_has_forty_keys_in_fixed_order() {
        let layout = KeyboardLayout::fallback();
        assert_eq!(layout.len(), 40);
        assert_eq!(layout.key_at(0), Some("1"));
        assert_eq!(layout.key_at(9), Some("0"));
        assert_eq!(layout.key_at(10), Some("Q"));
        assert_eq!(layout.key_at(29), Some(KEY_SPACE));
        assert_eq!(layout.key_at(37), Some(KEY_BACKSPACE));
        assert_eq!(layout.key_at(38), Some(KEY_SUGGEST));
        assert_eq!(layout.key_at(39), Some(KEY_SPEAK));
    }

    #[test]
    fn fallback_is_deterministic() {
        assert_eq!(KeyboardLayout::fallback(), KeyboardLayout::fallback());
    }

    #[test]
    fn key_lookup_out_of_range() {
        let layout = KeyboardLayout::from_keys(vec!["A".into()]);
        assert_eq!(layout.key_at(0), Some("A"));
        assert_eq!(layout.key_at(1), None);
    }
}
