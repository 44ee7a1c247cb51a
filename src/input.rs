//! Adapters that turn native input into the logical key stream the
//! controller understands. The core never sees raw terminal events.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKey {
    Char(char),
    /// Word boundary (space).
    Delimiter,
    Backspace,
    /// Begin a session when none is running.
    StartRequest,
}

/// Desktop keyboard mapping. Returns `None` for keys that are not typing
/// input (modified chords, navigation keys, key releases).
pub fn from_key_event(key: &KeyEvent) -> Option<LogicalKey> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    match key.code {
        KeyCode::Char(' ') => Some(LogicalKey::Delimiter),
        KeyCode::Char(c) => Some(LogicalKey::Char(c)),
        KeyCode::Backspace => Some(LogicalKey::Backspace),
        KeyCode::Enter => Some(LogicalKey::StartRequest),
        _ => None,
    }
}

/// Result of diffing a text box value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDiff {
    pub key: Option<LogicalKey>,
    /// The text box should be emptied after handling `key`.
    pub clear_value: bool,
}

/// Reconstruct a logical key from a soft-keyboard text box whose full value
/// is reported after every edit. `char_index` is the controller's position in
/// the current word.
///
/// - a trailing space commits the word and empties the box
/// - a value shorter than the typed prefix is a backspace
/// - otherwise the last character is the new keystroke
pub fn diff_text_input(value: &str, char_index: usize) -> TextDiff {
    if value.ends_with(' ') {
        return TextDiff {
            key: Some(LogicalKey::Delimiter),
            clear_value: true,
        };
    }

    if value.chars().count() < char_index {
        return TextDiff {
            key: Some(LogicalKey::Backspace),
            clear_value: false,
        };
    }

    TextDiff {
        key: value.chars().last().map(LogicalKey::Char),
        clear_value: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_typing_keys() {
        assert_eq!(
            from_key_event(&key(KeyCode::Char('a'))),
            Some(LogicalKey::Char('a'))
        );
        assert_eq!(
            from_key_event(&key(KeyCode::Char(' '))),
            Some(LogicalKey::Delimiter)
        );
        assert_eq!(
            from_key_event(&key(KeyCode::Backspace)),
            Some(LogicalKey::Backspace)
        );
        assert_eq!(
            from_key_event(&key(KeyCode::Enter)),
            Some(LogicalKey::StartRequest)
        );
    }

    #[test]
    fn shifted_chars_are_typing_input() {
        let ev = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(from_key_event(&ev), Some(LogicalKey::Char('A')));
    }

    #[test]
    fn ignores_chords_and_navigation() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(from_key_event(&ctrl_c), None);
        assert_eq!(from_key_event(&key(KeyCode::Left)), None);
        assert_eq!(from_key_event(&key(KeyCode::Tab)), None);
    }

    #[test]
    fn ignores_key_release() {
        let mut ev = key(KeyCode::Char('a'));
        ev.kind = KeyEventKind::Release;
        assert_eq!(from_key_event(&ev), None);
    }

    #[test]
    fn text_diff_new_char() {
        let diff = diff_text_input("ca", 1);
        assert_eq!(diff.key, Some(LogicalKey::Char('a')));
        assert!(!diff.clear_value);
    }

    #[test]
    fn text_diff_space_commits_and_clears() {
        let diff = diff_text_input("ca ", 2);
        assert_eq!(diff.key, Some(LogicalKey::Delimiter));
        assert!(diff.clear_value);
    }

    #[test]
    fn text_diff_shorter_value_is_backspace() {
        let diff = diff_text_input("c", 2);
        assert_eq!(diff.key, Some(LogicalKey::Backspace));
    }

    #[test]
    fn text_diff_empty_value_at_word_start() {
        assert_eq!(diff_text_input("", 0).key, None);
    }

    #[test]
    fn text_diff_counts_chars_not_bytes() {
        let diff = diff_text_input("ñ", 1);
        assert_eq!(diff.key, Some(LogicalKey::Char('ñ')));
    }
}
